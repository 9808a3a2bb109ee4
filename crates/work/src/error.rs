//! Error types for the enterprise API clients

use std::time::Duration;

use thiserror::Error;
use wecom_common::credential::CredentialError;
use wecom_common::error::{ErrorClassification, ErrorSeverity};
use wecom_common::http::HttpError;

/// Main error type for enterprise API calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkError {
    /// The API answered with a non-zero `errcode`
    #[error("api error: errcode={code}, errmsg={message}")]
    Api { code: i64, message: String },

    /// Obtaining the access token failed
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for enterprise API calls
pub type WorkResult<T> = std::result::Result<T, WorkError>;

impl WorkError {
    /// Provider error code, whether it came from the API call itself or from
    /// the token refresh beneath it.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            Self::Credential(err) => err.provider_code(),
            _ => None,
        }
    }
}

impl From<HttpError> for WorkError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Decode(message) => Self::Decode(message),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for WorkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl ErrorClassification for WorkError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Credential(err) => err.is_retryable(),
            Self::Transport(_) => true,
            Self::Api { code, .. } => {
                CredentialError::provider(*code, String::new()).is_retryable()
            }
            Self::Decode(_) | Self::Config(_) | Self::InvalidInput(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Credential(err) => err.severity(),
            Self::Transport(_) => ErrorSeverity::Warning,
            Self::Api { .. } if self.is_retryable() => ErrorSeverity::Warning,
            Self::Api { .. } | Self::Decode(_) | Self::InvalidInput(_) => ErrorSeverity::Error,
            Self::Config(_) => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        match self {
            Self::Credential(err) => err.is_critical(),
            Self::Config(_) => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Credential(err) => err.retry_after(),
            Self::Api { code, .. } => CredentialError::provider(*code, String::new()).retry_after(),
            _ => None,
        }
    }
}
