use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

/// Uniform failure envelope shared by every handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn payment_required(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::PAYMENT_REQUIRED, code, message)
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, code, message)
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CONFLICT, code, message)
    }

    pub fn too_many_requests(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::TOO_MANY_REQUESTS, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }

    fn with_status(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: self.message.clone(),
            error_code: self.code.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.to_body())).into_response()
    }
}

/// Logs a rejected request and renders the failure envelope.
pub fn reject(err: AppError, context: &'static str) -> Response {
    tracing::error!(error_code = err.code, reason = %err.message, "{context}");
    err.into_response()
}

/// Unwraps an extracted JSON body. Malformed, mistyped or non-JSON bodies become `INVALID_BODY`.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(invalid_body)
}

pub fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::bad_request("INVALID_BODY", rejection.body_text())
}
