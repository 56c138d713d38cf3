use once_cell::sync::Lazy;
use std::collections::HashMap;

const STATES: &[(&str, &str)] = &[
    ("AN", "Andaman and Nicobar Islands"),
    ("AP", "Andhra Pradesh"),
    ("AR", "Arunachal Pradesh"),
    ("AS", "Assam"),
    ("BR", "Bihar"),
    ("CG", "Chhattisgarh"),
    ("CH", "Chandigarh"),
    ("DD", "Dadra and Nagar Haveli and Daman and Diu"),
    ("DL", "Delhi"),
    ("GA", "Goa"),
    ("GJ", "Gujarat"),
    ("HP", "Himachal Pradesh"),
    ("HR", "Haryana"),
    ("JH", "Jharkhand"),
    ("JK", "Jammu and Kashmir"),
    ("KA", "Karnataka"),
    ("KL", "Kerala"),
    ("LA", "Ladakh"),
    ("LD", "Lakshadweep"),
    ("MH", "Maharashtra"),
    ("ML", "Meghalaya"),
    ("MN", "Manipur"),
    ("MP", "Madhya Pradesh"),
    ("MZ", "Mizoram"),
    ("NL", "Nagaland"),
    ("OD", "Odisha"),
    ("PB", "Punjab"),
    ("PY", "Puducherry"),
    ("RJ", "Rajasthan"),
    ("SK", "Sikkim"),
    ("TN", "Tamil Nadu"),
    ("TR", "Tripura"),
    ("TS", "Telangana"),
    ("UK", "Uttarakhand"),
    ("UP", "Uttar Pradesh"),
    ("WB", "West Bengal"),
];

// Older registration series still seen on plates.
const LEGACY_CODES: &[(&str, &str)] = &[("OR", "OD"), ("TG", "TS"), ("UA", "UK"), ("DN", "DD")];

static NAME_BY_CODE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, &'static str> = STATES.iter().copied().collect();
    for (legacy, current) in LEGACY_CODES {
        if let Some(name) = map.get(current).copied() {
            map.insert(legacy, name);
        }
    }
    map
});

static CODE_BY_NAME: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    STATES
        .iter()
        .map(|(code, name)| (name.to_ascii_lowercase(), *code))
        .collect()
});

/// Upper-cases and strips separators: `ap 16-bz 3508` -> `AP16BZ3508`.
pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub fn state_name_for_code(code: &str) -> Option<&'static str> {
    NAME_BY_CODE.get(code.trim().to_ascii_uppercase().as_str()).copied()
}

/// Accepts either an RTO code (`AP`) or a state name (`andhra pradesh`).
pub fn state_code_for(input: &str) -> Option<&'static str> {
    let trimmed = input.trim();
    if let Some((code, _)) = NAME_BY_CODE.get_key_value(trimmed.to_ascii_uppercase().as_str()) {
        return LEGACY_CODES
            .iter()
            .find(|(legacy, _)| legacy == code)
            .map(|(_, current)| *current)
            .or(Some(*code));
    }
    CODE_BY_NAME.get(&trimmed.to_ascii_lowercase()).copied()
}

pub fn plate_state_code(plate: &str) -> Option<&'static str> {
    let normalized = normalize_plate(plate);
    let prefix = normalized.get(..2)?;
    if !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    state_code_for(prefix)
}

/// Canonical state name used as the fine schedule key. Unknown inputs pass through trimmed.
pub fn canonical_state(input: &str) -> String {
    match state_code_for(input).and_then(state_name_for_code) {
        Some(name) => name.to_string(),
        None => input.trim().to_string(),
    }
}

pub fn challan_prefix(state: &str) -> String {
    if let Some(code) = state_code_for(state) {
        return code.to_string();
    }
    let prefix: String = state
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(2)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if prefix.is_empty() {
        "XX".to_string()
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plate_prefix_maps_to_state() {
        assert_eq!(plate_state_code("AP16BZ3508"), Some("AP"));
        assert_eq!(plate_state_code("ts 09 ab 1234"), Some("TS"));
        assert_eq!(plate_state_code("TG09AB1234"), Some("TS"));
        assert_eq!(plate_state_code("1234"), None);
        assert_eq!(plate_state_code("ZZ01AA0001"), None);
    }

    #[test]
    fn state_name_or_code_resolves_to_prefix() {
        assert_eq!(challan_prefix("Andhra Pradesh"), "AP");
        assert_eq!(challan_prefix("ap"), "AP");
        assert_eq!(challan_prefix("Atlantis"), "AT");
        assert_eq!(challan_prefix("  "), "XX");
    }

    #[test]
    fn canonical_state_is_stable() {
        assert_eq!(canonical_state("KA"), "Karnataka");
        assert_eq!(canonical_state("karnataka"), "Karnataka");
        assert_eq!(canonical_state(" Atlantis "), "Atlantis");
    }

    #[test]
    fn normalize_strips_separators() {
        assert_eq!(normalize_plate("ap 16-bz 3508"), "AP16BZ3508");
    }
}
