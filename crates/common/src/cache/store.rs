//! Cache store trait and its error type

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a cache store backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The store refused the entry (e.g. a zero TTL)
    #[error("cache rejected key '{key}': {reason}")]
    Rejected { key: String, reason: String },

    /// The backing service failed
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Key-value store with per-key expiry
///
/// Implementations must be safe to share between every credential handle of
/// a process; only single-key operations need to be atomic.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a live value. Expired or missing keys return `None`.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` for `ttl`.
    ///
    /// # Errors
    /// Returns [`CacheError`] if the backend rejects or fails the write.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove `key` (idempotent).
    ///
    /// # Errors
    /// Returns [`CacheError::Backend`] if the backend fails.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
