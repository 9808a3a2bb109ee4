//! In-process cache store backed by moka
//!
//! Each entry carries its own TTL through a [`moka::Expiry`] policy, so tokens
//! with different provider lifetimes can share one store.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;

use super::store::{CacheError, CacheStore};

/// Default max capacity for the in-memory store (10 000 keys)
pub const DEFAULT_MEMORY_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    ttl: Duration,
}

/// Expire every entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory [`CacheStore`] for single-process deployments and tests
#[derive(Clone)]
pub struct MemoryCacheStore {
    entries: Cache<String, StoredValue>,
}

impl MemoryCacheStore {
    /// Create a store with [`DEFAULT_MEMORY_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    /// Create a store holding at most `max_capacity` keys.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        let entries = Cache::builder().max_capacity(max_capacity).expire_after(PerEntryTtl).build();
        Self { entries }
    }

    /// Approximate number of live entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheStore").field("entries", &self.entries.entry_count()).finish()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).await.map(|stored| stored.value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Err(CacheError::Rejected {
                key: key.to_string(),
                reason: "ttl must be greater than zero".to_string(),
            });
        }

        self.entries
            .insert(key.to_string(), StoredValue { value: value.to_string(), ttl })
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}
