use crate::utils::error::{RelayError, Result};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

/// Token from an `Authorization: Bearer ...` header, if present and well formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Checks the request's bearer token against the configured import key.
pub fn verify_bearer(headers: &HeaderMap, expected: &str) -> Result<()> {
    let Some(token) = bearer_token(headers) else {
        return Err(RelayError::AuthenticationError {
            message: "missing bearer token".to_string(),
        });
    };

    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        return Err(RelayError::AuthenticationError {
            message: "invalid bearer token".to_string(),
        });
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
