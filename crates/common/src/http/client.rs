use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::credential::CredentialError;

/// Query parameters whose values never appear in logs.
const SENSITIVE_QUERY_KEYS: &[&str] = &["access_token", "corpsecret", "secret"];

/// Errors raised by [`HttpClient`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    /// The request could not be built or sent
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid for the expected type
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.without_url().to_string())
        }
    }
}

impl From<HttpError> for CredentialError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Decode(message) => Self::Decode { message },
            other => Self::Transport { message: other.to_string() },
        }
    }
}

/// HTTP client with built-in retry and timeout support.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, HttpError> {
        Self::builder().build()
    }

    /// A clone sharing the connection pool that never retries.
    #[must_use]
    pub fn single_attempt(&self) -> Self {
        Self { client: self.client.clone(), max_attempts: 1, base_backoff: self.base_backoff }
    }

    /// Configured number of attempts (initial try + retries).
    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, HttpError> {
        let attempts = self.max_attempts.max(1);

        for attempt in 0..attempts {
            let request = builder
                .try_clone()
                .ok_or_else(|| HttpError::Transport("streaming request bodies cannot be retried".into()))?
                .build()?;

            let method = request.method().clone();
            let url = redact_url(request.url());
            debug!(attempt = attempt + 1, %method, %url, "provider request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "provider response");

                    if status.is_server_error() && attempt + 1 < attempts {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    let error = describe_error(&err);
                    debug!(attempt = attempt + 1, %method, %url, %error, "provider request failed");

                    if attempt + 1 < attempts && should_retry_error(&err) {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Err(err.into());
                }
            }
        }

        Err(HttpError::Transport(format!("no response after {attempts} attempts")))
    }

    /// GET `url` and decode a JSON body into `T`.
    pub async fn get_json<T>(&self, url: &str) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::GET, url)).await?;
        decode_json(response).await
    }

    /// POST `body` as JSON to `url` and decode a JSON body into `T`.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::POST, url).json(body)).await?;
        decode_json(response).await
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, HttpError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let body = String::from_utf8_lossy(&bytes).chars().take(256).collect();
        return Err(HttpError::Status { status: status.as_u16(), body });
    }

    serde_json::from_slice(&bytes).map_err(|err| HttpError::Decode(err.to_string()))
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
    system_proxy: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
            system_proxy: true,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Ignore `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub fn no_proxy(mut self) -> Self {
        self.system_proxy = false;
        self
    }

    pub fn build(self) -> Result<HttpClient, HttpError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);

        if !self.system_proxy {
            builder = builder.no_proxy();
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build()?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_request() {
        return true;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    false
}

/// Render `url` with credential-bearing query values masked.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if SENSITIVE_QUERY_KEYS.contains(&key.as_ref()) {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

fn describe_error(err: &reqwest::Error) -> String {
    match err.url() {
        Some(url) => err.to_string().replace(url.as_str(), &redact_url(url)),
        None => err.to_string(),
    }
}
