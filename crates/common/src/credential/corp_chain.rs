//! Delegated credential for a downstream corp in a corp chain
//!
//! The parent corp's token is exchanged for a token scoped to
//! `(chain_corp_id, agent_id, business_type)`. The parent keeps its own cache
//! entry and refresh guard; this handle only ever reaches the provider
//! through the parent's [`AccessTokenHandle`].

use std::sync::Arc;

use async_trait::async_trait;

use super::access_token::{require, WorkAccessToken};
use super::endpoint::{ChainTokenRequest, TokenEndpoint};
use super::error::CredentialResult;
use super::handle::{AccessTokenHandle, ParentTokenHandle};
use super::single_flight::CredentialCache;
use super::token::{IssuedToken, TtlPolicy};
use crate::cache::CacheStore;

/// Token of a downstream corp, obtained through the parent corp's token
pub struct CorpChainAccessToken {
    parent: Arc<WorkAccessToken>,
    chain_corp_id: String,
    agent_id: i64,
    business_type: i64,
    cache_key_prefix: String,
    endpoint: Arc<TokenEndpoint>,
    cache: CredentialCache,
}

impl CorpChainAccessToken {
    /// Start building a delegated handle on top of `parent`.
    pub fn builder(parent: Arc<WorkAccessToken>) -> CorpChainAccessTokenBuilder {
        CorpChainAccessTokenBuilder {
            parent,
            chain_corp_id: String::new(),
            agent_id: 0,
            business_type: 0,
            cache_key_prefix: None,
            cache: None,
            endpoint: None,
            ttl_policy: TtlPolicy::default(),
        }
    }

    #[must_use]
    pub fn parent(&self) -> &Arc<WorkAccessToken> {
        &self.parent
    }

    #[must_use]
    pub fn chain_corp_id(&self) -> &str {
        &self.chain_corp_id
    }

    #[must_use]
    pub fn agent_id(&self) -> i64 {
        self.agent_id
    }

    #[must_use]
    pub fn business_type(&self) -> i64 {
        self.business_type
    }

    /// Cache key: `{prefix}_chain_access_token_{chain_corp_id}_{agent_id}`.
    ///
    /// The parent corp is not part of the key. When several parent corps
    /// delegate to the same downstream corp and agent over one shared store,
    /// give each parent its own `cache_key_prefix` or they will read each
    /// other's delegated tokens.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "{}_chain_access_token_{}_{}",
            self.cache_key_prefix, self.chain_corp_id, self.agent_id
        )
    }

    fn request(&self) -> ChainTokenRequest {
        ChainTokenRequest {
            corp_id: self.chain_corp_id.clone(),
            business_type: self.business_type,
            agent_id: self.agent_id,
        }
    }

    /// Exchange the parent's current token for a fresh delegated token.
    ///
    /// The parent token itself still comes from the parent's cache.
    ///
    /// # Errors
    /// The parent's refresh error, or the exchange's transport, decode or
    /// provider error.
    pub async fn fetch_from_server(&self) -> CredentialResult<IssuedToken> {
        let parent_token = self.parent.get_access_token().await?;
        self.endpoint.chain_token(&parent_token, &self.request()).await
    }
}

#[async_trait]
impl AccessTokenHandle for CorpChainAccessToken {
    async fn get_access_token(&self) -> CredentialResult<String> {
        let parent = Arc::clone(&self.parent);
        let endpoint = Arc::clone(&self.endpoint);
        let request = self.request();

        self.cache
            .get_or_refresh(&self.cache_key(), move || async move {
                let parent_token = parent.get_access_token().await?;
                endpoint.chain_token(&parent_token, &request).await
            })
            .await
    }
}

#[async_trait]
impl ParentTokenHandle for CorpChainAccessToken {
    async fn get_parent_access_token(&self) -> CredentialResult<String> {
        self.parent.get_access_token().await
    }
}

impl std::fmt::Debug for CorpChainAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpChainAccessToken")
            .field("parent", &self.parent)
            .field("chain_corp_id", &self.chain_corp_id)
            .field("agent_id", &self.agent_id)
            .field("business_type", &self.business_type)
            .finish()
    }
}

/// Builder for [`CorpChainAccessToken`]
///
/// Cache store and endpoint default to the parent's.
pub struct CorpChainAccessTokenBuilder {
    parent: Arc<WorkAccessToken>,
    chain_corp_id: String,
    agent_id: i64,
    business_type: i64,
    cache_key_prefix: Option<String>,
    cache: Option<Arc<dyn CacheStore>>,
    endpoint: Option<Arc<TokenEndpoint>>,
    ttl_policy: TtlPolicy,
}

impl CorpChainAccessTokenBuilder {
    pub fn chain_corp_id(mut self, corp_id: impl Into<String>) -> Self {
        self.chain_corp_id = corp_id.into();
        self
    }

    pub fn agent_id(mut self, agent_id: i64) -> Self {
        self.agent_id = agent_id;
        self
    }

    pub fn business_type(mut self, business_type: i64) -> Self {
        self.business_type = business_type;
        self
    }

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
    /// [`CredentialError::Configuration`](super::CredentialError::Configuration)
    /// when the downstream corp id is empty.
    pub fn build(self) -> CredentialResult<CorpChainAccessToken> {
        require(&self.chain_corp_id, "chain_corp_id")?;

        let store = self.cache.unwrap_or_else(|| Arc::clone(self.parent.store()));
        let endpoint = self.endpoint.unwrap_or_else(|| Arc::clone(self.parent.endpoint()));
        let cache_key_prefix =
            self.cache_key_prefix.unwrap_or_else(|| self.parent.cache_key_prefix().to_string());

        Ok(CorpChainAccessToken {
            parent: self.parent,
            chain_corp_id: self.chain_corp_id,
            agent_id: self.agent_id,
            business_type: self.business_type,
            cache_key_prefix,
            endpoint,
            cache: CredentialCache::new(store, self.ttl_policy),
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::credential::{CredentialError, CACHE_KEY_WORK_PREFIX};
    use crate::http::HttpClient;

    fn parent_for(server: &MockServer, store: Arc<dyn CacheStore>) -> Arc<WorkAccessToken> {
        parent_with_prefix(server, store, "ww-parent", CACHE_KEY_WORK_PREFIX)
    }

    fn parent_with_prefix(
        server: &MockServer,
        store: Arc<dyn CacheStore>,
        corp_id: &str,
        prefix: &str,
    ) -> Arc<WorkAccessToken> {
        let endpoint = TokenEndpoint::with_client(HttpClient::new().unwrap())
            .work_domain(server.uri());
        Arc::new(
            WorkAccessToken::builder()
                .corp_id(corp_id)
                .corp_secret("parent-secret")
                .cache_key_prefix(prefix)
                .cache(store)
                .endpoint(Arc::new(endpoint))
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn cache_key_uses_chain_corp_and_agent() {
        let server = MockServer::start().await;
        let parent = parent_for(&server, Arc::new(MemoryCacheStore::new()));
        let chain = CorpChainAccessToken::builder(parent)
            .chain_corp_id("ww-child")
            .agent_id(1_000_002)
            .business_type(1)
            .build()
            .unwrap();

        assert_eq!(chain.cache_key(), "gowechat_work__chain_access_token_ww-child_1000002");
        assert_ne!(chain.cache_key(), chain.parent().cache_key());
    }

    #[tokio::test]
    async fn empty_chain_corp_id_is_configuration_error() {
        let server = MockServer::start().await;
        let result =
            CorpChainAccessToken::builder(parent_for(&server, Arc::new(MemoryCacheStore::new())))
                .agent_id(1)
                .build();
        assert!(matches!(result, Err(CredentialError::Configuration { .. })));
    }

    #[tokio::test]
    async fn parent_token_is_served_from_parent_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/gettoken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 0, "errmsg": "ok", "access_token": "P1", "expires_in": 7200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new());
        let parent = parent_for(&server, Arc::clone(&store));
        let chain = CorpChainAccessToken::builder(Arc::clone(&parent))
            .chain_corp_id("ww-child")
            .build()
            .unwrap();

        assert_eq!(chain.get_parent_access_token().await.unwrap(), "P1");
        assert_eq!(parent.get_access_token().await.unwrap(), "P1");
        assert!(store.get(&chain.cache_key()).await.is_none());
        assert!(store.get(&parent.cache_key()).await.is_some());
    }

    #[tokio::test]
    async fn parents_sharing_a_store_keep_delegated_tokens_apart() {
        let server = MockServer::start().await;
        for (corp_id, parent_token) in [("ww-a", "PA"), ("ww-b", "PB")] {
            Mock::given(method("GET"))
                .and(path("/cgi-bin/gettoken"))
                .and(query_param("corpid", corp_id))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "errcode": 0, "errmsg": "ok", "access_token": parent_token, "expires_in": 7200
                })))
                .expect(1)
                .mount(&server)
                .await;
        }
        for (parent_token, chain_token) in [("PA", "CA"), ("PB", "CB")] {
            Mock::given(method("POST"))
                .and(path("/cgi-bin/corpgroup/corp/gettoken"))
                .and(query_param("access_token", parent_token))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "errcode": 0, "errmsg": "ok", "access_token": chain_token, "expires_in": 7200
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let store: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new());
        let chain_a = CorpChainAccessToken::builder(parent_with_prefix(
            &server,
            Arc::clone(&store),
            "ww-a",
            "tenant_a_",
        ))
        .chain_corp_id("ww-child")
        .agent_id(1)
        .build()
        .unwrap();
        let chain_b = CorpChainAccessToken::builder(parent_with_prefix(
            &server,
            Arc::clone(&store),
            "ww-b",
            "tenant_b_",
        ))
        .chain_corp_id("ww-child")
        .agent_id(1)
        .build()
        .unwrap();

        assert_ne!(chain_a.cache_key(), chain_b.cache_key());
        assert_eq!(chain_a.get_access_token().await.unwrap(), "CA");
        assert_eq!(chain_b.get_access_token().await.unwrap(), "CB");
        assert_eq!(chain_a.get_access_token().await.unwrap(), "CA");
    }
}
