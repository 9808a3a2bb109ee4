//! Entry point wiring configuration, cache store and credentials together

use std::sync::Arc;

use moka::sync::Cache;
use tracing::{debug, info};
use wecom_common::cache::CacheStore;
use wecom_common::credential::{
    AccessTokenHandle, CorpChainAccessToken, TicketKind, TokenEndpoint, TtlPolicy,
    WorkAccessToken, WorkJsTicket,
};
use wecom_common::http::HttpClient;

use crate::agent::Agent;
use crate::config::WorkConfig;
use crate::context::Context;
use crate::corpchain::CorpChain;
use crate::error::{WorkError, WorkResult};
use crate::oauth::OAuth;

/// Delegated handles are keyed like their cache entries.
type ChainIdentity = (String, i64);

/// Enterprise app client
///
/// Built once at wiring time. The corp token handle, the JS-SDK ticket
/// handles and every delegated handle handed out by [`Work::corp_chain`] live
/// as long as this value (and its clones); clone the returned clients freely.
#[derive(Clone)]
pub struct Work {
    context: Context,
    cache: Arc<dyn CacheStore>,
    token: Arc<WorkAccessToken>,
    corp_ticket: Arc<WorkJsTicket>,
    agent_ticket: Option<Arc<WorkJsTicket>>,
    chain_handles: Cache<ChainIdentity, Arc<CorpChainAccessToken>>,
}

impl Work {
    /// Wire an enterprise client over `cache`.
    ///
    /// # Errors
    /// [`WorkError::Config`] when `cache` is `None` or `config` is invalid.
    pub fn new(config: WorkConfig, cache: Option<Arc<dyn CacheStore>>) -> WorkResult<Self> {
        let cache = cache.ok_or_else(|| WorkError::Config("cache store is required".to_string()))?;
        config.validate()?;

        let http = HttpClient::builder().timeout(config.request_timeout()).build()?;
        let endpoint = Arc::new(
            TokenEndpoint::with_client(http.clone()).work_domain(config.qyapi_domain.as_str()),
        );
        let ttl_policy = TtlPolicy::new(config.token_margin());

        let token = Arc::new(
            WorkAccessToken::builder()
                .corp_id(config.corp_id.as_str())
                .corp_secret(config.corp_secret.as_str())
                .cache(Arc::clone(&cache))
                .endpoint(Arc::clone(&endpoint))
                .ttl_policy(ttl_policy)
                .build()?,
        );
        let token_handle: Arc<dyn AccessTokenHandle> = token.clone();

        let corp_ticket = Arc::new(
            WorkJsTicket::builder(Arc::clone(&token_handle))
                .corp_id(config.corp_id.as_str())
                .cache(Arc::clone(&cache))
                .endpoint(Arc::clone(&endpoint))
                .ttl_policy(ttl_policy)
                .build()?,
        );
        let agent_ticket = config
            .agent_id
            .map(|agent_id| {
                WorkJsTicket::builder(Arc::clone(&token_handle))
                    .corp_id(config.corp_id.as_str())
                    .agent(agent_id)
                    .cache(Arc::clone(&cache))
                    .endpoint(Arc::clone(&endpoint))
                    .ttl_policy(ttl_policy)
                    .build()
                    .map(Arc::new)
            })
            .transpose()?;

        info!(corp_id = %config.corp_id, agent_id = ?config.agent_id, "enterprise client ready");

        Ok(Self {
            context: Context::new(Arc::new(config), http, token_handle),
            cache,
            token,
            corp_ticket,
            agent_ticket,
            chain_handles: Cache::builder().build(),
        })
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The corp credential handle shared by every client of this app.
    #[must_use]
    pub fn access_token(&self) -> &Arc<WorkAccessToken> {
        &self.token
    }

    #[must_use]
    pub fn oauth(&self) -> OAuth {
        OAuth::new(self.context.clone())
    }

    #[must_use]
    pub fn agent(&self) -> Agent {
        Agent::new(self.context.clone())
    }

    /// JS-SDK ticket handle of the given kind.
    ///
    /// # Errors
    /// [`WorkError::Config`] for [`TicketKind::Agent`] when no agent id is
    /// configured.
    pub fn js_ticket(&self, kind: TicketKind) -> WorkResult<Arc<WorkJsTicket>> {
        match kind {
            TicketKind::Corp => Ok(Arc::clone(&self.corp_ticket)),
            TicketKind::Agent => self.agent_ticket.clone().ok_or_else(|| {
                WorkError::Config("agent_id is required for agent tickets".to_string())
            }),
        }
    }

    /// Client acting for downstream corp `chain_corp_id` through this corp.
    ///
    /// The delegated handle for `(chain_corp_id, agent_id)` is built on first
    /// use and shared by every later call, so all clients of one downstream
    /// identity refresh through a single guard.
    ///
    /// # Errors
    /// - [`WorkError::Credential`] when `chain_corp_id` is empty
    /// - [`WorkError::Config`] when the identity is already bound to another
    ///   `business_type`
    pub fn corp_chain(
        &self,
        chain_corp_id: &str,
        agent_id: i64,
        business_type: i64,
    ) -> WorkResult<CorpChain> {
        let handle = self.chain_handle(chain_corp_id, agent_id, business_type)?;
        if handle.business_type() != business_type {
            return Err(WorkError::Config(format!(
                "corp chain {chain_corp_id}/{agent_id} is bound to business_type {}, not {business_type}",
                handle.business_type()
            )));
        }

        let mut config = self.context.config().clone();
        config.corp_id = chain_corp_id.to_string();
        config.agent_id = Some(agent_id);

        let context = Context::new(Arc::new(config), self.context.http().clone(), handle.clone());
        Ok(CorpChain::new(context, handle))
    }

    fn chain_handle(
        &self,
        chain_corp_id: &str,
        agent_id: i64,
        business_type: i64,
    ) -> WorkResult<Arc<CorpChainAccessToken>> {
        let identity = (chain_corp_id.to_string(), agent_id);
        self.chain_handles
            .try_get_with(identity, || {
                debug!(chain_corp_id, agent_id, business_type, "building corp chain handle");
                CorpChainAccessToken::builder(Arc::clone(&self.token))
                    .chain_corp_id(chain_corp_id)
                    .agent_id(agent_id)
                    .business_type(business_type)
                    .cache(Arc::clone(&self.cache))
                    .ttl_policy(TtlPolicy::new(self.context.config().token_margin()))
                    .build()
                    .map(Arc::new)
            })
            .map_err(|err| WorkError::Credential((*err).clone()))
    }
}

impl std::fmt::Debug for Work {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Work")
            .field("context", &self.context)
            .field("token", &self.token)
            .field("agent_ticket", &self.agent_ticket.is_some())
            .finish_non_exhaustive()
    }
}
