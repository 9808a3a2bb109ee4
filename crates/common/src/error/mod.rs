//! Error classification shared across WeCom SDK crates
//!
//! Every error type in the SDK implements [`ErrorClassification`] so callers
//! can make retry and alerting decisions without matching on each crate's
//! concrete error enum.
//!
//! ## Severity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Cancelled refresh |
//! | **Warning** | Degraded but operational | Transport failures, provider rate limiting |
//! | **Error** | Failure requiring attention | Malformed provider responses, invalid secret |
//! | **Critical** | Misconfiguration | Missing cache store, empty corp id |
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use wecom_common::error::{ErrorClassification, ErrorSeverity};
//!
//! #[derive(Debug)]
//! enum FetchError {
//!     Busy,
//!     Rejected,
//! }
//!
//! impl ErrorClassification for FetchError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::Busy => ErrorSeverity::Warning,
//!             Self::Rejected => ErrorSeverity::Error,
//!         }
//!     }
//!
//!     fn is_critical(&self) -> bool {
//!         false
//!     }
//!
//!     fn retry_after(&self) -> Option<Duration> {
//!         None
//!     }
//! }
//!
//! assert!(FetchError::Busy.is_retryable());
//! assert_eq!(FetchError::Rejected.severity(), ErrorSeverity::Error);
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error classification trait for consistent error handling across crates
///
/// Provides a standard interface for classifying errors by their
/// characteristics, enabling consistent retry logic, monitoring, and alerting.
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as network timeouts or provider frequency limits.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
