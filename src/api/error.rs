use crate::utils::error::{ErrorCategory, RelayError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Failures that end a request before or outside the per-lead loop.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Unexpected server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            ApiError::Unauthorized => ("Unauthorized".to_string(), None),
            ApiError::BadRequest(msg) => (msg.clone(), None),
            ApiError::NotConfigured(_) => ("Server misconfigured".to_string(), Some(self.to_string())),
            ApiError::Internal(details) => {
                ("Unexpected server error".to_string(), Some(details.clone()))
            }
        };
        ErrorBody {
            success: false,
            error,
            details,
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err.category() {
            ErrorCategory::Authentication => ApiError::Unauthorized,
            ErrorCategory::Validation => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        if code.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (code, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_error_mapping() {
        let auth: ApiError = RelayError::AuthenticationError {
            message: "bad token".to_string(),
        }
        .into();
        assert_eq!(auth.status_code(), StatusCode::UNAUTHORIZED);

        let io: ApiError = RelayError::IoError(std::io::Error::other("disk")).into();
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_configured_body() {
        let body = ApiError::NotConfigured("IMPORT_API_KEY").body();
        assert!(!body.success);
        assert_eq!(body.error, "Server misconfigured");
        assert_eq!(
            body.details.as_deref(),
            Some("IMPORT_API_KEY is not configured")
        );
    }
}
