//! Direct credentials: app id + secret, corp id + secret
//!
//! Both handles are cache-aside over a shared [`CacheStore`] with their own
//! refresh guard. They differ only in the identity they embed into the cache
//! key and the remote operation used to refresh.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::endpoint::TokenEndpoint;
use super::error::{CredentialError, CredentialResult};
use super::handle::AccessTokenHandle;
use super::single_flight::CredentialCache;
use super::token::{IssuedToken, TtlPolicy};
use crate::cache::CacheStore;

/// Cache key prefix for official-account credentials
pub const CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX: &str = "gowechat_officialaccount_";

/// Cache key prefix for mini-program credentials
pub const CACHE_KEY_MINI_PROGRAM_PREFIX: &str = "gowechat_miniprogram_";

/// Cache key prefix for enterprise (work) credentials
pub const CACHE_KEY_WORK_PREFIX: &str = "gowechat_work_";

/// Hex SHA-256 of a secret, used so distinct secrets never share a cache key
/// and the raw secret never appears in one.
#[must_use]
pub fn secret_fingerprint(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

pub(crate) fn require(value: &str, field: &str) -> CredentialResult<()> {
    if value.trim().is_empty() {
        return Err(CredentialError::configuration(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn resolve_endpoint(
    endpoint: Option<Arc<TokenEndpoint>>,
) -> CredentialResult<Arc<TokenEndpoint>> {
    match endpoint {
        Some(endpoint) => Ok(endpoint),
        None => TokenEndpoint::new().map(Arc::new),
    }
}

pub(crate) fn require_cache(cache: Option<Arc<dyn CacheStore>>) -> CredentialResult<Arc<dyn CacheStore>> {
    cache.ok_or_else(|| CredentialError::configuration("cache store is required"))
}

// -----------------------------------------------------------------------------
// App credential
// -----------------------------------------------------------------------------

/// Access token of an official account or mini program
pub struct DefaultAccessToken {
    app_id: String,
    app_secret: String,
    cache_key_prefix: String,
    endpoint: Arc<TokenEndpoint>,
    cache: CredentialCache,
}

impl DefaultAccessToken {
    pub fn builder() -> DefaultAccessTokenBuilder {
        DefaultAccessTokenBuilder::default()
    }

    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Cache key for this identity: `{prefix}_access_token_{app_id}`.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{}_access_token_{}", self.cache_key_prefix, self.app_id)
    }

    /// Fetch a new token from the provider, bypassing and not touching the
    /// cache.
    ///
    /// # Errors
    /// Transport, decode or provider errors.
    pub async fn fetch_from_server(&self) -> CredentialResult<IssuedToken> {
        self.endpoint.app_token(&self.app_id, &self.app_secret).await
    }
}

#[async_trait]
impl AccessTokenHandle for DefaultAccessToken {
    async fn get_access_token(&self) -> CredentialResult<String> {
        let endpoint = Arc::clone(&self.endpoint);
        let app_id = self.app_id.clone();
        let app_secret = self.app_secret.clone();

        self.cache
            .get_or_refresh(&self.cache_key(), move || async move {
                endpoint.app_token(&app_id, &app_secret).await
            })
            .await
    }
}

impl std::fmt::Debug for DefaultAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultAccessToken")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("cache_key_prefix", &self.cache_key_prefix)
            .finish()
    }
}

/// Builder for [`DefaultAccessToken`]
#[derive(Default)]
pub struct DefaultAccessTokenBuilder {
    app_id: String,
    app_secret: String,
    cache_key_prefix: Option<String>,
    cache: Option<Arc<dyn CacheStore>>,
    endpoint: Option<Arc<TokenEndpoint>>,
    ttl_policy: TtlPolicy,
}

impl DefaultAccessTokenBuilder {
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    pub fn app_secret(mut self, app_secret: impl Into<String>) -> Self {
        self.app_secret = app_secret.into();
        self
    }

    /// Defaults to [`CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX`].
    pub fn cache_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_key_prefix = Some(prefix.into());
        self
    }

    pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn endpoint(mut self, endpoint: Arc<TokenEndpoint>) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn ttl_policy(mut self, policy: TtlPolicy) -> Self {
        self.ttl_policy = policy;
        self
    }

    /// # Errors
    /// [`CredentialError::Configuration`] when the cache store, app id or
    /// secret is missing.
    pub fn build(self) -> CredentialResult<DefaultAccessToken> {
        let store = require_cache(self.cache)?;
        require(&self.app_id, "app_id")?;
        require(&self.app_secret, "app_secret")?;

        Ok(DefaultAccessToken {
            app_id: self.app_id,
            app_secret: self.app_secret,
            cache_key_prefix: self
                .cache_key_prefix
                .unwrap_or_else(|| CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX.to_string()),
            endpoint: resolve_endpoint(self.endpoint)?,
            cache: CredentialCache::new(store, self.ttl_policy),
        })
    }
}

// -----------------------------------------------------------------------------
// Corp credential
// -----------------------------------------------------------------------------

/// Access token of an enterprise corp (corp id + app secret)
pub struct WorkAccessToken {
    corp_id: String,
    corp_secret: String,
    cache_key_prefix: String,
    endpoint: Arc<TokenEndpoint>,
    cache: CredentialCache,
}

impl WorkAccessToken {
    pub fn builder() -> WorkAccessTokenBuilder {
        WorkAccessTokenBuilder::default()
    }

    #[must_use]
    pub fn corp_id(&self) -> &str {
        &self.corp_id
    }

    /// Token endpoint, shared with delegated handles built on this one.
    #[must_use]
    pub fn endpoint(&self) -> &Arc<TokenEndpoint> {
        &self.endpoint
    }

    /// Cache store, shared with delegated handles built on this one.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        self.cache.store()
    }

    #[must_use]
    pub fn cache_key_prefix(&self) -> &str {
        &self.cache_key_prefix
    }

    /// Cache key: `{prefix}_access_token_{corp_id}_{sha256(secret)}`.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "{}_access_token_{}_{}",
            self.cache_key_prefix,
            self.corp_id,
            secret_fingerprint(&self.corp_secret)
        )
    }

    /// Fetch a new token from the provider, bypassing and not touching the
    /// cache.
    ///
    /// # Errors
    /// Transport, decode or provider errors.
    pub async fn fetch_from_server(&self) -> CredentialResult<IssuedToken> {
        self.endpoint.corp_token(&self.corp_id, &self.corp_secret).await
    }
}

#[async_trait]
impl AccessTokenHandle for WorkAccessToken {
    async fn get_access_token(&self) -> CredentialResult<String> {
        let endpoint = Arc::clone(&self.endpoint);
        let corp_id = self.corp_id.clone();
        let corp_secret = self.corp_secret.clone();

        self.cache
            .get_or_refresh(&self.cache_key(), move || async move {
                endpoint.corp_token(&corp_id, &corp_secret).await
            })
            .await
    }
}

impl std::fmt::Debug for WorkAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkAccessToken")
            .field("corp_id", &self.corp_id)
            .field("corp_secret", &"<redacted>")
            .field("cache_key_prefix", &self.cache_key_prefix)
            .finish()
    }
}

/// Builder for [`WorkAccessToken`]
#[derive(Default)]
pub struct WorkAccessTokenBuilder {
    corp_id: String,
    corp_secret: String,
    cache_key_prefix: Option<String>,
    cache: Option<Arc<dyn CacheStore>>,
    endpoint: Option<Arc<TokenEndpoint>>,
    ttl_policy: TtlPolicy,
}

impl WorkAccessTokenBuilder {
    pub fn corp_id(mut self, corp_id: impl Into<String>) -> Self {
        self.corp_id = corp_id.into();
        self
    }

    pub fn corp_secret(mut self, corp_secret: impl Into<String>) -> Self {
        self.corp_secret = corp_secret.into();
        self
    }

    /// Defaults to [`CACHE_KEY_WORK_PREFIX`].
    pub fn cache_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_key_prefix = Some(prefix.into());
        self
    }

    pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn endpoint(mut self, endpoint: Arc<TokenEndpoint>) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn ttl_policy(mut self, policy: TtlPolicy) -> Self {
        self.ttl_policy = policy;
        self
    }

    /// # Errors
    /// [`CredentialError::Configuration`] when the cache store, corp id or
    /// secret is missing.
    pub fn build(self) -> CredentialResult<WorkAccessToken> {
        let store = require_cache(self.cache)?;
        require(&self.corp_id, "corp_id")?;
        require(&self.corp_secret, "corp_secret")?;

        Ok(WorkAccessToken {
            corp_id: self.corp_id,
            corp_secret: self.corp_secret,
            cache_key_prefix: self
                .cache_key_prefix
                .unwrap_or_else(|| CACHE_KEY_WORK_PREFIX.to_string()),
            endpoint: resolve_endpoint(self.endpoint)?,
            cache: CredentialCache::new(store, self.ttl_policy),
        })
    }
}
