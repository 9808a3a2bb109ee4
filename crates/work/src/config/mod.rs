//! Enterprise API configuration
//!
//! [`WorkConfig`] carries the corp credential, optional agent id and API
//! domains. It can be built in code or loaded through [`loader`].

pub mod loader;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use wecom_common::credential::DEFAULT_SAFETY_MARGIN;

use crate::error::{WorkError, WorkResult};

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};

/// Default enterprise API domain
pub const DEFAULT_QYAPI_DOMAIN: &str = "https://qyapi.weixin.qq.com";

/// Default domain for web login (QR connect)
pub const DEFAULT_OPEN_QYAPI_DOMAIN: &str = "https://open.work.weixin.qq.com";

/// Default domain for in-app OAuth redirects
pub const DEFAULT_OPEN_API_DOMAIN: &str = "https://open.weixin.qq.com";

/// Default HTTP timeout for API calls, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_qyapi_domain() -> String {
    DEFAULT_QYAPI_DOMAIN.to_string()
}

fn default_open_qyapi_domain() -> String {
    DEFAULT_OPEN_QYAPI_DOMAIN.to_string()
}

fn default_open_api_domain() -> String {
    DEFAULT_OPEN_API_DOMAIN.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_token_margin_secs() -> u64 {
    DEFAULT_SAFETY_MARGIN.as_secs()
}

/// Configuration of one enterprise app
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkConfig {
    pub corp_id: String,
    pub corp_secret: String,

    #[serde(default)]
    pub agent_id: Option<i64>,

    #[serde(default = "default_qyapi_domain")]
    pub qyapi_domain: String,

    #[serde(default = "default_open_qyapi_domain")]
    pub open_qyapi_domain: String,

    #[serde(default = "default_open_api_domain")]
    pub open_api_domain: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Seconds subtracted from a token's lifetime before it is cached
    #[serde(default = "default_token_margin_secs")]
    pub token_margin_secs: u64,
}

impl WorkConfig {
    /// Config with default domains and timings.
    pub fn new(corp_id: impl Into<String>, corp_secret: impl Into<String>) -> Self {
        Self {
            corp_id: corp_id.into(),
            corp_secret: corp_secret.into(),
            agent_id: None,
            qyapi_domain: default_qyapi_domain(),
            open_qyapi_domain: default_open_qyapi_domain(),
            open_api_domain: default_open_api_domain(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_margin_secs: default_token_margin_secs(),
        }
    }

    #[must_use]
    pub fn with_agent_id(mut self, agent_id: i64) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    #[must_use]
    pub fn with_qyapi_domain(mut self, domain: impl Into<String>) -> Self {
        self.qyapi_domain = domain.into();
        self
    }

    #[must_use]
    pub fn with_open_qyapi_domain(mut self, domain: impl Into<String>) -> Self {
        self.open_qyapi_domain = domain.into();
        self
    }

    #[must_use]
    pub fn with_open_api_domain(mut self, domain: impl Into<String>) -> Self {
        self.open_api_domain = domain.into();
        self
    }

    #[must_use]
    pub fn with_token_margin_secs(mut self, secs: u64) -> Self {
        self.token_margin_secs = secs;
        self
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn token_margin(&self) -> Duration {
        Duration::from_secs(self.token_margin_secs)
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    /// Returns [`WorkError::Config`] for an empty corp id, secret or domain,
    /// or a zero timeout or margin.
    pub fn validate(&self) -> WorkResult<()> {
        if self.corp_id.trim().is_empty() {
            return Err(WorkError::Config("corp_id must not be empty".to_string()));
        }
        if self.corp_secret.trim().is_empty() {
            return Err(WorkError::Config("corp_secret must not be empty".to_string()));
        }
        for (name, domain) in [
            ("qyapi_domain", &self.qyapi_domain),
            ("open_qyapi_domain", &self.open_qyapi_domain),
            ("open_api_domain", &self.open_api_domain),
        ] {
            if domain.trim().is_empty() {
                return Err(WorkError::Config(format!("{name} must not be empty")));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(WorkError::Config("request_timeout_secs must be positive".to_string()));
        }
        if self.token_margin_secs == 0 {
            return Err(WorkError::Config("token_margin_secs must be positive".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for WorkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkConfig")
            .field("corp_id", &self.corp_id)
            .field("corp_secret", &"<redacted>")
            .field("agent_id", &self.agent_id)
            .field("qyapi_domain", &self.qyapi_domain)
            .field("open_qyapi_domain", &self.open_qyapi_domain)
            .field("open_api_domain", &self.open_api_domain)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("token_margin_secs", &self.token_margin_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_domains() {
        let config = WorkConfig::new("ww", "secret");
        assert_eq!(config.qyapi_domain, DEFAULT_QYAPI_DOMAIN);
        assert_eq!(config.open_qyapi_domain, DEFAULT_OPEN_QYAPI_DOMAIN);
        assert_eq!(config.open_api_domain, DEFAULT_OPEN_API_DOMAIN);
        assert_eq!(config.token_margin(), Duration::from_secs(1500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_credentials() {
        let err = WorkConfig::new("", "secret").validate().unwrap_err();
        assert_eq!(err, WorkError::Config("corp_id must not be empty".to_string()));

        let err = WorkConfig::new("ww", " ").validate().unwrap_err();
        assert_eq!(err, WorkError::Config("corp_secret must not be empty".to_string()));
    }

    #[test]
    fn validate_rejects_zero_timings() {
        let mut config = WorkConfig::new("ww", "secret");
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let config = WorkConfig::new("ww", "secret").with_token_margin_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", WorkConfig::new("ww", "very-secret"));
        assert!(!rendered.contains("very-secret"));
    }
}
