//! Cache-aside refresh with one in-flight fetch per credential handle
//!
//! [`CredentialCache::get_or_refresh`] reads the store without locking, then
//! serialises misses on the handle's own mutex and re-reads the store before
//! fetching. The fetch runs in a spawned task that owns the lock guard: a
//! caller that is cancelled while waiting for the result leaves the refresh
//! running, and every later caller still observes at most one fetch.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::error::{CredentialError, CredentialResult};
use super::token::{IssuedToken, TtlPolicy};
use crate::cache::CacheStore;

/// Store access plus the per-handle refresh guard
pub struct CredentialCache {
    store: Arc<dyn CacheStore>,
    refresh_lock: Arc<Mutex<()>>,
    ttl_policy: TtlPolicy,
}

impl CredentialCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl_policy: TtlPolicy) -> Self {
        Self { store, refresh_lock: Arc::new(Mutex::new(())), ttl_policy }
    }

    /// The shared cache store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    #[must_use]
    pub fn ttl_policy(&self) -> TtlPolicy {
        self.ttl_policy
    }

    /// Return the cached value under `key`, or run `fetch` once and cache it.
    ///
    /// # Errors
    /// Propagates the fetch error unchanged; returns [`CredentialError::Cache`]
    /// if the store rejects the refreshed value and
    /// [`CredentialError::Cancelled`] if the refresh task is aborted.
    pub async fn get_or_refresh<F, Fut>(&self, key: &str, fetch: F) -> CredentialResult<String>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = CredentialResult<IssuedToken>> + Send + 'static,
    {
        if let Some(value) = self.store.get(key).await {
            debug!(key, "credential cache hit");
            return Ok(value);
        }

        let guard = Arc::clone(&self.refresh_lock).lock_owned().await;

        if let Some(value) = self.store.get(key).await {
            debug!(key, "credential refreshed by a concurrent caller");
            return Ok(value);
        }

        let store = Arc::clone(&self.store);
        let policy = self.ttl_policy;
        let key = key.to_string();

        let refresh = tokio::spawn(async move {
            let _guard = guard;

            info!(key = %key, "refreshing credential");
            let issued = fetch().await.inspect_err(|err| {
                warn!(key = %key, error = %err, "credential refresh failed");
            })?;

            if policy.is_clamped(issued.expires_in) {
                warn!(
                    key = %key,
                    expires_in = issued.expires_in,
                    margin_secs = policy.margin().as_secs(),
                    "provider lifetime shorter than safety margin; clamping ttl"
                );
            }

            match policy.ttl_for(issued.expires_in) {
                Some(ttl) => {
                    store.set(&key, &issued.value, ttl).await?;
                    info!(key = %key, ttl_secs = ttl.as_secs(), "credential stored");
                }
                None => {
                    warn!(key = %key, expires_in = issued.expires_in, "credential has no lifetime; not cached");
                }
            }

            Ok::<_, CredentialError>(issued.value)
        });

        match refresh.await {
            Ok(result) => result,
            Err(join_err) => {
                error!(error = %join_err, "credential refresh task did not complete");
                Err(CredentialError::Cancelled)
            }
        }
    }
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache").field("ttl_policy", &self.ttl_policy).finish()
    }
}
