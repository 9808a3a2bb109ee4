//! Credential error taxonomy
//!
//! Every failure path of the credential engine returns one of these variants
//! immediately; nothing is retried or swallowed inside the engine.

use std::time::Duration;

use thiserror::Error;

use crate::cache::CacheError;
use crate::error::{ErrorClassification, ErrorSeverity};

/// Provider code for "system busy, retry later"
pub const PROVIDER_SYSTEM_BUSY: i64 = -1;

/// Provider code for "API call frequency out of limit"
pub const PROVIDER_FREQUENCY_LIMITED: i64 = 45009;

/// Provider code for "too many concurrent calls"
pub const PROVIDER_CONCURRENCY_LIMITED: i64 = 45033;

/// Result type for credential operations
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Errors surfaced by credential handles
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// The handle is misconfigured (missing cache store, empty id or secret)
    #[error("credential configuration error: {message}")]
    Configuration { message: String },

    /// The provider could not be reached or answered with a non-2xx status
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The provider response did not match the expected schema
    #[error("decode error: {message}")]
    Decode { message: String },

    /// The provider answered with a non-zero `errcode`
    #[error("get access_token error: errcode={code}, errmsg={message}")]
    Provider { code: i64, message: String },

    /// The cache store rejected the refreshed value
    #[error("cache error: {message}")]
    Cache { message: String },

    /// The refresh task was aborted before completing
    #[error("credential refresh was cancelled")]
    Cancelled,
}

impl CredentialError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode { message: message.into() }
    }

    /// Create a provider error from an `errcode`/`errmsg` pair
    pub fn provider(code: i64, message: impl Into<String>) -> Self {
        Self::Provider { code, message: message.into() }
    }

    /// Provider status code, when the provider flagged the failure
    #[must_use]
    pub fn provider_code(&self) -> Option<i64> {
        match self {
            Self::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CredentialError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode { message: err.to_string() }
        } else {
            Self::Transport { message: err.without_url().to_string() }
        }
    }
}

impl From<serde_json::Error> for CredentialError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode { message: err.to_string() }
    }
}

impl From<CacheError> for CredentialError {
    fn from(err: CacheError) -> Self {
        Self::Cache { message: err.to_string() }
    }
}

impl ErrorClassification for CredentialError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Cache { .. } | Self::Cancelled => true,
            Self::Provider { code, .. } => matches!(
                *code,
                PROVIDER_SYSTEM_BUSY | PROVIDER_FREQUENCY_LIMITED | PROVIDER_CONCURRENCY_LIMITED
            ),
            Self::Configuration { .. } | Self::Decode { .. } => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration { .. } => ErrorSeverity::Critical,
            Self::Transport { .. } | Self::Cache { .. } => ErrorSeverity::Warning,
            Self::Decode { .. } => ErrorSeverity::Error,
            Self::Provider { .. } if self.is_retryable() => ErrorSeverity::Warning,
            Self::Provider { .. } => ErrorSeverity::Error,
            Self::Cancelled => ErrorSeverity::Info,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Provider { code, .. } if *code == PROVIDER_FREQUENCY_LIMITED => {
                Some(Duration::from_secs(60))
            }
            Self::Provider { code, .. } if *code == PROVIDER_SYSTEM_BUSY => {
                Some(Duration::from_secs(1))
            }
            _ => None,
        }
    }
}
