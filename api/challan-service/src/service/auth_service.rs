use super::integration::Integration;
use crate::module::error::{invalid_body, AppError};
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::Json;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OperatorTokenVerifier {
    secret: String,
}

impl OperatorTokenVerifier {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn verify(&self, token: &str) -> Result<OperatorClaims, String> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<OperatorClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| format!("invalid operator token: {e}"))
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Returns the operator subject. Without a configured secret any bearer token is
/// accepted and the demo mode is logged.
pub fn authorize_operator(
    auth: &Integration<OperatorTokenVerifier>,
    headers: &HeaderMap,
) -> Result<String, AppError> {
    let Some(token) = bearer_token(headers) else {
        return Err(AppError::unauthorized(
            "MISSING_BEARER_TOKEN",
            "authorization bearer token is required",
        ));
    };

    match auth {
        Integration::Configured(verifier) => verifier
            .verify(token)
            .map(|claims| claims.sub)
            .map_err(|e| AppError::unauthorized("INVALID_BEARER_TOKEN", e)),
        Integration::Unconfigured => {
            warn!("operator auth not configured; accepting bearer token in demo mode");
            Ok("demo-operator".to_string())
        }
    }
}

/// Body of an operator-only request. A caller without a valid token gets 401 even
/// when the body is also malformed.
pub fn operator_body<T>(
    auth: &Integration<OperatorTokenVerifier>,
    headers: &HeaderMap,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            authorize_operator(auth, headers)?;
            Err(invalid_body(rejection))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp: i64) -> String {
        let claims = OperatorClaims {
            sub: "officer-7".to_string(),
            exp,
            role: Some("operator".to_string()),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode")
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", value.parse().expect("header"));
        headers
    }

    #[test]
    fn configured_verifier_accepts_valid_token() {
        let auth = Integration::Configured(OperatorTokenVerifier::new("s3cret".to_string()));
        let exp = chrono::Utc::now().timestamp() + 600;
        let headers = headers_with(&format!("Bearer {}", token("s3cret", exp)));
        assert_eq!(authorize_operator(&auth, &headers).expect("ok"), "officer-7");
    }

    #[test]
    fn configured_verifier_rejects_wrong_secret() {
        let auth = Integration::Configured(OperatorTokenVerifier::new("s3cret".to_string()));
        let exp = chrono::Utc::now().timestamp() + 600;
        let headers = headers_with(&format!("Bearer {}", token("other", exp)));
        let err = authorize_operator(&auth, &headers).expect_err("must reject");
        assert_eq!(err.code, "INVALID_BEARER_TOKEN");
    }

    #[test]
    fn missing_header_is_unauthorized_even_in_demo_mode() {
        let auth: Integration<OperatorTokenVerifier> = Integration::Unconfigured;
        let err = authorize_operator(&auth, &HeaderMap::new()).expect_err("must reject");
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }
}
