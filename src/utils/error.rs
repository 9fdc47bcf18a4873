use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("CRM request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{message}")]
    ValidationError { message: String },

    #[error("CRM lookup failed with status {status}")]
    RemoteReadError { status: u16, body: String },

    #[error("CRM write failed with status {status}")]
    RemoteWriteError { status: u16, body: String },

    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Remote,
    Configuration,
    Authentication,
    Internal,
}

impl RelayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self::validation(format!("missing {}", field))
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::HttpError(_) | Self::RemoteReadError { .. } | Self::RemoteWriteError { .. } => {
                ErrorCategory::Remote
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::AuthenticationError { .. } => ErrorCategory::Authentication,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    /// Raw upstream response body, when the CRM answered with an error status.
    pub fn upstream_body(&self) -> Option<&str> {
        match self {
            Self::RemoteReadError { body, .. } | Self::RemoteWriteError { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }

    /// Upstream details as JSON: the body parsed when possible, the raw text otherwise.
    pub fn details(&self) -> Option<serde_json::Value> {
        let body = self.upstream_body()?;
        if body.trim().is_empty() {
            return None;
        }
        Some(
            serde_json::from_str(body)
                .unwrap_or_else(|_| serde_json::Value::String(body.to_string())),
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Relay is not configured correctly: {}", self),
            ErrorCategory::Authentication => "Unauthorized".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = RelayError::missing_field("postcode");
        assert_eq!(err.to_string(), "missing postcode");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.details().is_none());
    }

    #[test]
    fn test_details_parses_json_body() {
        let err = RelayError::RemoteWriteError {
            status: 422,
            body: r#"{"message":"Name is required"}"#.to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Remote);
        assert_eq!(
            err.details().unwrap(),
            serde_json::json!({"message": "Name is required"})
        );
    }

    #[test]
    fn test_details_falls_back_to_text() {
        let err = RelayError::RemoteReadError {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(err.details().unwrap(), serde_json::json!("Bad Gateway"));
    }
}
