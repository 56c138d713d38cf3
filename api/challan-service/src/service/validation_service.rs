use crate::module::error::AppError;

pub const MAX_PLATE_LEN: usize = 20;

/// Alphanumerics, hyphens and spaces, at most 20 characters, at least one alphanumeric.
pub fn validate_plate(raw: &str) -> Result<(), AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(
            "INVALID_PLATE_NUMBER",
            "plate_number is required",
        ));
    }
    if trimmed.chars().count() > MAX_PLATE_LEN {
        return Err(AppError::bad_request(
            "INVALID_PLATE_NUMBER",
            format!("plate_number must be at most {MAX_PLATE_LEN} characters"),
        ));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ' ')
    {
        return Err(AppError::bad_request(
            "INVALID_PLATE_NUMBER",
            "plate_number may only contain letters, digits, hyphens and spaces",
        ));
    }
    if !trimmed.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::bad_request(
            "INVALID_PLATE_NUMBER",
            "plate_number must contain at least one letter or digit",
        ));
    }
    Ok(())
}

pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
