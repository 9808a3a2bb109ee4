//! Web and in-app OAuth for enterprise members
//!
//! URL builders are pure; the user-info calls authenticate with the corp
//! token of the [`Context`].

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::{WorkError, WorkResult};

const AUTHORIZE_PATH: &str = "/connect/oauth2/authorize";
const QR_CONNECT_PATH: &str = "/wwopen/sso/qrConnect";
const USER_FROM_CODE_PATH: &str = "/cgi-bin/user/getuserinfo";
const GET_USER_INFO_PATH: &str = "/cgi-bin/auth/getuserinfo";
const GET_USER_DETAIL_PATH: &str = "/cgi-bin/auth/getuserdetail";

const STATE_LEN: usize = 16;

/// Identity behind an OAuth code (legacy endpoint)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CodeUserInfo {
    /// Present for corp members
    #[serde(rename = "UserId", default)]
    pub user_id: String,
    #[serde(rename = "DeviceId", default)]
    pub device_id: String,
    /// Present for non-members
    #[serde(rename = "OpenId", default)]
    pub open_id: String,
    #[serde(default)]
    pub external_userid: String,
}

/// Identity behind an OAuth code
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "userid", default)]
    pub user_id: String,
    #[serde(rename = "openid", default)]
    pub open_id: String,
    /// Ticket for [`OAuth::get_user_info_detail`], only for `snsapi_privateinfo`
    #[serde(default)]
    pub user_ticket: String,
    #[serde(default)]
    pub external_userid: String,
}

#[derive(Debug, Serialize)]
struct UserDetailRequest<'a> {
    user_ticket: &'a str,
}

/// Sensitive member fields the user consented to share
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserDetail {
    #[serde(rename = "userid")]
    pub user_id: String,
    pub gender: String,
    pub avatar: String,
    pub qr_code: String,
    pub mobile: String,
    pub email: String,
    pub biz_mail: String,
    pub address: String,
}

/// OAuth client
#[derive(Debug, Clone)]
pub struct OAuth {
    context: Context,
}

impl OAuth {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    /// In-app authorize URL with a fixed `STATE`.
    #[must_use]
    pub fn target_url(&self, callback_url: &str) -> String {
        let config = self.context.config();
        format!(
            "{}{AUTHORIZE_PATH}?appid={}&redirect_uri={}&response_type=code&scope=snsapi_base&state=STATE#wechat_redirect",
            config.open_api_domain.trim_end_matches('/'),
            config.corp_id,
            urlencoding::encode(callback_url),
        )
    }

    /// Browser authorize URL for `agent_id`, with a fresh random state.
    ///
    /// Returns `(url, state)`; the caller must check the state on callback.
    #[must_use]
    pub fn web_target_url(&self, callback_url: &str, agent_id: i64) -> (String, String) {
        let config = self.context.config();
        let state = random_state();
        let url = format!(
            "{}{AUTHORIZE_PATH}?appid={}&redirect_uri={}&response_type=code&scope=snsapi_base&state={state}&agentid={agent_id}#wechat_redirect",
            config.open_api_domain.trim_end_matches('/'),
            config.corp_id,
            urlencoding::encode(callback_url),
        );
        (url, state)
    }

    /// Standalone QR-code login URL for the configured agent.
    ///
    /// Returns `(url, state)`.
    ///
    /// # Errors
    /// [`WorkError::Config`] when no agent id is configured.
    pub fn qr_connect_url(&self, callback_url: &str) -> WorkResult<(String, String)> {
        let config = self.context.config();
        let agent_id = config
            .agent_id
            .ok_or_else(|| WorkError::Config("agent_id is required for QR login".to_string()))?;
        let state = random_state();
        let url = format!(
            "{}{QR_CONNECT_PATH}?appid={}&agentid={agent_id}&redirect_uri={}&state={state}",
            config.open_qyapi_domain.trim_end_matches('/'),
            config.corp_id,
            urlencoding::encode(callback_url),
        );
        Ok((url, state))
    }

    /// Resolve an OAuth `code` through the legacy member endpoint.
    ///
    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn user_from_code(&self, code: &str) -> WorkResult<CodeUserInfo> {
        self.context.get_api(USER_FROM_CODE_PATH, &[("code", code)]).await
    }

    /// Resolve an OAuth `code` to the visiting user's identity.
    ///
    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn get_user_info(&self, code: &str) -> WorkResult<UserInfo> {
        self.context.get_api(GET_USER_INFO_PATH, &[("code", code)]).await
    }

    /// Fetch the sensitive fields behind a `user_ticket`.
    ///
    /// # Errors
    /// [`WorkError::InvalidInput`] for an empty ticket (no request is sent),
    /// otherwise credential, transport, decode or API errors.
    pub async fn get_user_info_detail(&self, user_ticket: &str) -> WorkResult<UserDetail> {
        if user_ticket.is_empty() {
            return Err(WorkError::InvalidInput("missing user_ticket".to_string()));
        }
        self.context.post_api(GET_USER_DETAIL_PATH, &[], &UserDetailRequest { user_ticket }).await
    }
}

fn random_state() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(STATE_LEN).map(char::from).collect()
}
