//! Remote token issuance operations
//!
//! Every call here is a single attempt: retries are the caller's decision.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::error::{CredentialError, CredentialResult};
use super::token::{IssuedToken, RemoteToken};
use crate::http::HttpClient;

/// Default domain of the enterprise (work) API
pub const DEFAULT_WORK_API_DOMAIN: &str = "https://qyapi.weixin.qq.com";

/// Default domain of the official-account / mini-program API
pub const DEFAULT_OFFICIAL_API_DOMAIN: &str = "https://api.weixin.qq.com";

const APP_TOKEN_PATH: &str = "/cgi-bin/token";
const CORP_TOKEN_PATH: &str = "/cgi-bin/gettoken";
const CHAIN_TOKEN_PATH: &str = "/cgi-bin/corpgroup/corp/gettoken";
const CORP_TICKET_PATH: &str = "/cgi-bin/get_jsapi_ticket";
const AGENT_TICKET_PATH: &str = "/cgi-bin/ticket/get";

/// Body of the delegated (corp chain) token exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTokenRequest {
    #[serde(rename = "corpid")]
    pub corp_id: String,

    pub business_type: i64,

    #[serde(rename = "agentid")]
    pub agent_id: i64,
}

/// Which JS-SDK ticket to issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketKind {
    /// `wx.config` ticket for the whole corp
    Corp,
    /// `wx.agentConfig` ticket for one agent
    Agent,
}

/// Client for the provider's token and ticket endpoints
#[derive(Debug, Clone)]
pub struct TokenEndpoint {
    http: HttpClient,
    work_domain: String,
    official_domain: String,
}

impl TokenEndpoint {
    /// Endpoint with the default domains and a default HTTP client.
    ///
    /// # Errors
    /// Returns [`CredentialError::Configuration`] if the HTTP client cannot be
    /// built.
    pub fn new() -> CredentialResult<Self> {
        let http = HttpClient::new().map_err(|err| {
            CredentialError::configuration(format!("failed to build http client: {err}"))
        })?;
        Ok(Self::with_client(http))
    }

    /// Endpoint sharing `http`'s connection pool, without its retries.
    #[must_use]
    pub fn with_client(http: HttpClient) -> Self {
        Self {
            http: http.single_attempt(),
            work_domain: DEFAULT_WORK_API_DOMAIN.to_string(),
            official_domain: DEFAULT_OFFICIAL_API_DOMAIN.to_string(),
        }
    }

    #[must_use]
    pub fn work_domain(mut self, domain: impl Into<String>) -> Self {
        self.work_domain = trim_domain(domain.into());
        self
    }

    #[must_use]
    pub fn official_domain(mut self, domain: impl Into<String>) -> Self {
        self.official_domain = trim_domain(domain.into());
        self
    }

    /// Issue an app (official account / mini program) access token.
    ///
    /// # Errors
    /// Transport, decode or provider errors of the single request.
    pub async fn app_token(&self, app_id: &str, app_secret: &str) -> CredentialResult<IssuedToken> {
        let url = build_url(
            &self.official_domain,
            APP_TOKEN_PATH,
            &[("grant_type", "client_credential"), ("appid", app_id), ("secret", app_secret)],
        )?;
        self.get_token(url).await
    }

    /// Issue a corp access token.
    ///
    /// # Errors
    /// Transport, decode or provider errors of the single request.
    pub async fn corp_token(
        &self,
        corp_id: &str,
        corp_secret: &str,
    ) -> CredentialResult<IssuedToken> {
        let url = build_url(
            &self.work_domain,
            CORP_TOKEN_PATH,
            &[("corpid", corp_id), ("corpsecret", corp_secret)],
        )?;
        self.get_token(url).await
    }

    /// Exchange a parent corp token for a delegated (downstream corp) token.
    ///
    /// # Errors
    /// Transport, decode or provider errors of the single request.
    pub async fn chain_token(
        &self,
        parent_token: &str,
        request: &ChainTokenRequest,
    ) -> CredentialResult<IssuedToken> {
        let url =
            build_url(&self.work_domain, CHAIN_TOKEN_PATH, &[("access_token", parent_token)])?;
        let response: RemoteToken = self.http.post_json(url.as_str(), request).await?;
        response.into_issued()
    }

    /// Issue a JS-SDK ticket authorised by `access_token`.
    ///
    /// # Errors
    /// Transport, decode or provider errors of the single request.
    pub async fn js_ticket(
        &self,
        access_token: &str,
        kind: TicketKind,
    ) -> CredentialResult<IssuedToken> {
        let url = match kind {
            TicketKind::Corp => {
                build_url(&self.work_domain, CORP_TICKET_PATH, &[("access_token", access_token)])?
            }
            TicketKind::Agent => build_url(
                &self.work_domain,
                AGENT_TICKET_PATH,
                &[("access_token", access_token), ("type", "agent_config")],
            )?,
        };
        self.get_token(url).await
    }

    async fn get_token(&self, url: Url) -> CredentialResult<IssuedToken> {
        let response: RemoteToken = self.http.get_json(url.as_str()).await?;
        response.into_issued()
    }
}

fn trim_domain(domain: String) -> String {
    domain.trim_end_matches('/').to_string()
}

fn build_url(domain: &str, path: &str, params: &[(&str, &str)]) -> CredentialResult<Url> {
    Url::parse_with_params(&format!("{domain}{path}"), params).map_err(|err| {
        CredentialError::configuration(format!("invalid api domain '{domain}': {err}"))
    })
}
