//! Mock implementations of the cache and credential traits
//!
//! Provides instrumented stand-ins for testing credential handles and the
//! clients built on them.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{CacheError, CacheStore, MemoryCacheStore};
use crate::credential::{AccessTokenHandle, CredentialError, CredentialResult};

type TtlLog = Arc<Mutex<HashMap<String, Duration>>>;

/// A [`MemoryCacheStore`] that records every write
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::time::Duration;
/// use wecom_common::cache::CacheStore;
/// use wecom_common::testing::RecordingCacheStore;
///
/// let store = RecordingCacheStore::new();
/// store.set("k", "v", Duration::from_secs(30)).await.unwrap();
/// assert_eq!(store.recorded_ttl("k"), Some(Duration::from_secs(30)));
/// assert_eq!(store.set_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingCacheStore {
    inner: MemoryCacheStore,
    ttls: TtlLog,
    sets: Arc<AtomicUsize>,
    gets: Arc<AtomicUsize>,
}

impl RecordingCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// TTL of the most recent write to `key`
    pub fn recorded_ttl(&self, key: &str) -> Option<Duration> {
        // SAFETY: Mutex poisoning is acceptable in test mocks
        self.ttls.lock().unwrap().get(key).copied()
    }

    /// Keys written so far, sorted
    pub fn recorded_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.ttls.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for RecordingCacheStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.inner.set(key, value, ttl).await?;
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.ttls.lock().unwrap().insert(key.to_string(), ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.delete(key).await
    }
}

/// A cache store that never holds anything and rejects every write
#[derive(Debug, Clone, Default)]
pub struct FailingCacheStore;

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("store unavailable".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Backend("store unavailable".to_string()))
    }
}

/// An [`AccessTokenHandle`] returning a fixed result and counting calls
#[derive(Debug, Clone)]
pub struct StaticTokenHandle {
    result: CredentialResult<String>,
    calls: Arc<AtomicUsize>,
}

impl StaticTokenHandle {
    /// Handle that always returns `token`
    pub fn new(token: impl Into<String>) -> Self {
        Self { result: Ok(token.into()), calls: Arc::new(AtomicUsize::new(0)) }
    }

    /// Handle that always fails with `error`
    pub fn failing(error: CredentialError) -> Self {
        Self { result: Err(error), calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccessTokenHandle for StaticTokenHandle {
    async fn get_access_token(&self) -> CredentialResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_store_tracks_writes() {
        let store = RecordingCacheStore::new();
        store.set("b", "2", Duration::from_secs(20)).await.unwrap();
        store.set("a", "1", Duration::from_secs(10)).await.unwrap();

        assert_eq!(store.get("a").await.as_deref(), Some("1"));
        assert_eq!(store.recorded_keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.set_count(), 2);
        assert_eq!(store.get_count(), 1);
    }

    #[tokio::test]
    async fn rejected_write_is_not_recorded() {
        let store = RecordingCacheStore::new();
        assert!(store.set("k", "v", Duration::ZERO).await.is_err());
        assert_eq!(store.set_count(), 0);
        assert_eq!(store.recorded_ttl("k"), None);
    }

    #[tokio::test]
    async fn static_handle_counts_calls() {
        let handle = StaticTokenHandle::new("T1");
        assert_eq!(handle.get_access_token().await.unwrap(), "T1");
        assert_eq!(handle.get_access_token().await.unwrap(), "T1");
        assert_eq!(handle.calls(), 2);
    }
}
