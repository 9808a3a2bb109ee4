//! Agent (application) management

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::WorkResult;

const AGENT_GET_PATH: &str = "/cgi-bin/agent/get";
const AGENT_LIST_PATH: &str = "/cgi-bin/agent/list";
const AGENT_SET_PATH: &str = "/cgi-bin/agent/set";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AllowedUser {
    pub userid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AllowedUsers {
    pub user: Vec<AllowedUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AllowedParties {
    #[serde(rename = "partyid")]
    pub party_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AllowedTags {
    #[serde(rename = "tagid")]
    pub tag_ids: Vec<i64>,
}

/// Details of one agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgentInfo {
    #[serde(rename = "agentid")]
    pub agent_id: i64,
    pub name: String,
    pub square_logo_url: String,
    pub description: String,
    #[serde(rename = "allow_userinfos")]
    pub allow_user_infos: AllowedUsers,
    #[serde(rename = "allow_partys")]
    pub allow_parties: AllowedParties,
    pub allow_tags: AllowedTags,
    pub close: i64,
    pub redirect_domain: String,
    pub report_location_flag: i64,
    #[serde(rename = "isreportenter")]
    pub is_report_enter: i64,
    pub home_url: String,
}

/// Entry of [`Agent::list`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgentSummary {
    #[serde(rename = "agentid")]
    pub agent_id: i64,
    pub name: String,
    pub square_logo_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AgentList {
    #[serde(rename = "agentlist")]
    agents: Vec<AgentSummary>,
}

/// Settings accepted by [`Agent::set`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentSettings {
    #[serde(rename = "agentid")]
    pub agent_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_location_flag: Option<i64>,
    #[serde(rename = "logo_mediaid", skip_serializing_if = "Option::is_none")]
    pub logo_media_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_domain: Option<String>,
    #[serde(rename = "isreportenter", skip_serializing_if = "Option::is_none")]
    pub is_report_enter: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Ack {}

/// Agent management client
#[derive(Debug, Clone)]
pub struct Agent {
    context: Context,
}

impl Agent {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn get(&self, agent_id: i64) -> WorkResult<AgentInfo> {
        let agent_id = agent_id.to_string();
        self.context.get_api(AGENT_GET_PATH, &[("agentid", agent_id.as_str())]).await
    }

    /// Agents visible to the current token.
    ///
    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn list(&self) -> WorkResult<Vec<AgentSummary>> {
        let list: AgentList = self.context.get_api(AGENT_LIST_PATH, &[]).await?;
        Ok(list.agents)
    }

    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn set(&self, settings: &AgentSettings) -> WorkResult<()> {
        let _: Ack = self.context.post_api(AGENT_SET_PATH, &[], settings).await?;
        Ok(())
    }
}
