//! Shared state of the enterprise API clients
//!
//! A [`Context`] binds a configuration, an HTTP client and a credential
//! handle. Every resource client asks it for the current token and issues one
//! request through it.

use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use wecom_common::credential::AccessTokenHandle;
use wecom_common::http::HttpClient;

use crate::config::WorkConfig;
use crate::error::{WorkError, WorkResult};

/// Configuration, HTTP client and credential shared by resource clients
#[derive(Clone)]
pub struct Context {
    config: Arc<WorkConfig>,
    http: HttpClient,
    token: Arc<dyn AccessTokenHandle>,
}

impl Context {
    pub fn new(config: Arc<WorkConfig>, http: HttpClient, token: Arc<dyn AccessTokenHandle>) -> Self {
        Self { config, http, token }
    }

    #[must_use]
    pub fn config(&self) -> &WorkConfig {
        &self.config
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    #[must_use]
    pub fn token_handle(&self) -> &Arc<dyn AccessTokenHandle> {
        &self.token
    }

    /// Current access token of this context's credential.
    ///
    /// # Errors
    /// [`WorkError::Credential`] if the token cannot be obtained.
    pub async fn access_token(&self) -> WorkResult<String> {
        Ok(self.token.get_access_token().await?)
    }

    /// `GET {qyapi_domain}{path}` authenticated with this context's token.
    ///
    /// # Errors
    /// Credential, transport, decode or [`WorkError::Api`] errors.
    pub async fn get_api<T>(&self, path: &str, query: &[(&str, &str)]) -> WorkResult<T>
    where
        T: DeserializeOwned,
    {
        let token = self.access_token().await?;
        self.get_with_token(&token, path, query).await
    }

    /// `POST {qyapi_domain}{path}` with a JSON body, authenticated with this
    /// context's token.
    ///
    /// # Errors
    /// Credential, transport, decode or [`WorkError::Api`] errors.
    pub async fn post_api<B, T>(&self, path: &str, query: &[(&str, &str)], body: &B) -> WorkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.access_token().await?;
        self.post_with_token(&token, path, query, body).await
    }

    /// `GET` authenticated with an explicit token.
    ///
    /// # Errors
    /// Transport, decode or [`WorkError::Api`] errors.
    pub async fn get_with_token<T>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> WorkResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.api_url(token, path, query)?;
        debug!(path, "GET enterprise api");
        let body: Value = self.http.get_json(url.as_str()).await?;
        decode_envelope(body)
    }

    /// `POST` authenticated with an explicit token.
    ///
    /// # Errors
    /// Transport, decode or [`WorkError::Api`] errors.
    pub async fn post_with_token<B, T>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> WorkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.api_url(token, path, query)?;
        debug!(path, "POST enterprise api");
        let response: Value = self.http.post_json(url.as_str(), body).await?;
        decode_envelope(response)
    }

    fn api_url(&self, token: &str, path: &str, query: &[(&str, &str)]) -> WorkResult<Url> {
        let base = format!("{}{}", self.config.qyapi_domain.trim_end_matches('/'), path);
        let params = std::iter::once(("access_token", token)).chain(query.iter().copied());
        Url::parse_with_params(&base, params)
            .map_err(|e| WorkError::Config(format!("invalid api url '{base}': {e}")))
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Check the `errcode`/`errmsg` envelope and decode the rest into `T`.
fn decode_envelope<T: DeserializeOwned>(body: Value) -> WorkResult<T> {
    let code = body.get("errcode").and_then(Value::as_i64).unwrap_or(0);
    if code != 0 {
        let message = body.get("errmsg").and_then(Value::as_str).unwrap_or_default().to_string();
        return Err(WorkError::Api { code, message });
    }
    Ok(serde_json::from_value(body)?)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use wecom_common::testing::StaticTokenHandle;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Echo {
        name: String,
    }

    fn context_for(server: &MockServer) -> Context {
        let config = WorkConfig::new("ww", "secret").with_qyapi_domain(server.uri());
        Context::new(
            Arc::new(config),
            HttpClient::new().unwrap(),
            Arc::new(StaticTokenHandle::new("T1")),
        )
    }

    #[test]
    fn envelope_with_errcode_is_api_error() {
        let body = serde_json::json!({"errcode": 60011, "errmsg": "no privilege"});
        let result: WorkResult<Echo> = decode_envelope(body);
        assert_eq!(result, Err(WorkError::Api { code: 60011, message: "no privilege".into() }));
    }

    #[test]
    fn envelope_without_errcode_decodes() {
        let body = serde_json::json!({"name": "demo"});
        let echo: Echo = decode_envelope(body).unwrap();
        assert_eq!(echo.name, "demo");
    }

    #[tokio::test]
    async fn get_api_attaches_token_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/echo"))
            .and(query_param("access_token", "T1"))
            .and(query_param("agentid", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 0, "errmsg": "ok", "name": "demo"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let echo: Echo = context_for(&server).get_api("/cgi-bin/echo", &[("agentid", "7")]).await.unwrap();
        assert_eq!(echo, Echo { name: "demo".into() });
    }

    #[tokio::test]
    async fn post_api_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/echo"))
            .and(body_json(serde_json::json!({"name": "demo"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 0, "name": "demo"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let echo: Echo = context_for(&server)
            .post_api("/cgi-bin/echo", &[], &serde_json::json!({"name": "demo"}))
            .await
            .unwrap();
        assert_eq!(echo.name, "demo");
    }
}
