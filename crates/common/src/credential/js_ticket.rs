//! JS-SDK tickets, a derived credential authorised by a corp token

use std::sync::Arc;

use super::access_token::{require, require_cache, resolve_endpoint, CACHE_KEY_WORK_PREFIX};
use super::endpoint::{TicketKind, TokenEndpoint};
use super::error::{CredentialError, CredentialResult};
use super::handle::AccessTokenHandle;
use super::single_flight::CredentialCache;
use super::token::{IssuedToken, TtlPolicy};
use crate::cache::CacheStore;

/// `jsapi_ticket` of a corp or one of its agents
pub struct WorkJsTicket {
    corp_id: String,
    agent_id: Option<i64>,
    kind: TicketKind,
    cache_key_prefix: String,
    token: Arc<dyn AccessTokenHandle>,
    endpoint: Arc<TokenEndpoint>,
    cache: CredentialCache,
}

impl WorkJsTicket {
    /// Start building a ticket handle authorised by `token`.
    pub fn builder(token: Arc<dyn AccessTokenHandle>) -> WorkJsTicketBuilder {
        WorkJsTicketBuilder {
            token,
            corp_id: String::new(),
            agent_id: None,
            kind: TicketKind::Corp,
            cache_key_prefix: None,
            cache: None,
            endpoint: None,
            ttl_policy: TtlPolicy::default(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> TicketKind {
        self.kind
    }

    #[must_use]
    pub fn cache_key(&self) -> String {
        match (self.kind, self.agent_id) {
            (TicketKind::Agent, Some(agent_id)) => format!(
                "{}_qy_agent_jsapi_ticket_{}_{}",
                self.cache_key_prefix, self.corp_id, agent_id
            ),
            _ => format!("{}_qy_jsapi_ticket_{}", self.cache_key_prefix, self.corp_id),
        }
    }

    /// Issue a fresh ticket, bypassing the ticket cache.
    ///
    /// # Errors
    /// The access token's refresh error, or the ticket request's error.
    pub async fn fetch_from_server(&self) -> CredentialResult<IssuedToken> {
        let access_token = self.token.get_access_token().await?;
        self.endpoint.js_ticket(&access_token, self.kind).await
    }

    /// Return a valid ticket, refreshing it at most once per concurrent burst.
    ///
    /// # Errors
    /// As [`AccessTokenHandle::get_access_token`].
    pub async fn get_ticket(&self) -> CredentialResult<String> {
        let token = Arc::clone(&self.token);
        let endpoint = Arc::clone(&self.endpoint);
        let kind = self.kind;

        self.cache
            .get_or_refresh(&self.cache_key(), move || async move {
                let access_token = token.get_access_token().await?;
                endpoint.js_ticket(&access_token, kind).await
            })
            .await
    }
}

impl std::fmt::Debug for WorkJsTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkJsTicket")
            .field("corp_id", &self.corp_id)
            .field("agent_id", &self.agent_id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Builder for [`WorkJsTicket`]
pub struct WorkJsTicketBuilder {
    token: Arc<dyn AccessTokenHandle>,
    corp_id: String,
    agent_id: Option<i64>,
    kind: TicketKind,
    cache_key_prefix: Option<String>,
    cache: Option<Arc<dyn CacheStore>>,
    endpoint: Option<Arc<TokenEndpoint>>,
    ttl_policy: TtlPolicy,
}

impl WorkJsTicketBuilder {
    pub fn corp_id(mut self, corp_id: impl Into<String>) -> Self {
        self.corp_id = corp_id.into();
        self
    }

    /// Issue agent tickets for `agent_id` instead of corp tickets.
    pub fn agent(mut self, agent_id: i64) -> Self {
        self.agent_id = Some(agent_id);
        self.kind = TicketKind::Agent;
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
    /// [`CredentialError::Configuration`] when the cache store or corp id is
    /// missing, or an agent ticket has no agent id.
    pub fn build(self) -> CredentialResult<WorkJsTicket> {
        let store = require_cache(self.cache)?;
        require(&self.corp_id, "corp_id")?;
        if self.kind == TicketKind::Agent && self.agent_id.is_none() {
            return Err(CredentialError::configuration("agent ticket requires agent_id"));
        }

        Ok(WorkJsTicket {
            corp_id: self.corp_id,
            agent_id: self.agent_id,
            kind: self.kind,
            cache_key_prefix: self
                .cache_key_prefix
                .unwrap_or_else(|| CACHE_KEY_WORK_PREFIX.to_string()),
            token: self.token,
            endpoint: resolve_endpoint(self.endpoint)?,
            cache: CredentialCache::new(store, self.ttl_policy),
        })
    }
}
