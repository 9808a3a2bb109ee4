//! Request and response shapes of the corp chain API

use serde::{Deserialize, Serialize};

/// Filter for [`CorpChain::list_app_share_info`](super::CorpChain::list_app_share_info)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListAppShareInfoRequest {
    #[serde(rename = "agentid", skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<i64>,
    #[serde(rename = "corpid", skip_serializing_if = "Option::is_none")]
    pub corp_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SharedCorp {
    #[serde(rename = "corpid")]
    pub corp_id: String,
    pub corp_name: String,
    #[serde(rename = "agentid")]
    pub agent_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListAppShareInfoResponse {
    /// 1 when this page is the last one
    pub ending: i64,
    pub corp_list: Vec<SharedCorp>,
    pub next_cursor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Chain {
    pub chain_id: String,
    pub chain_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct ChainList {
    pub chains: Vec<Chain>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UnionidToExternalUseridRequest<'a> {
    pub unionid: &'a str,
    pub openid: &'a str,
    #[serde(rename = "corpid")]
    pub corp_id: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExternalUseridInfo {
    #[serde(rename = "corpid")]
    pub corp_id: String,
    pub external_userid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct UnionidToExternalUseridResponse {
    pub external_userid_info: Vec<ExternalUseridInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChainIdRequest<'a> {
    pub chain_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RuleRequest<'a> {
    pub chain_id: &'a str,
    pub rule_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct RuleIdList {
    pub rule_ids: Vec<i64>,
}

/// Members of the owning corp a sharing rule applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerCorpRange {
    #[serde(rename = "departmentids")]
    pub department_ids: Vec<String>,
    #[serde(rename = "userids")]
    pub user_ids: Vec<String>,
}

/// Downstream corps a sharing rule applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberCorpRange {
    #[serde(rename = "groupids")]
    pub group_ids: Vec<String>,
    #[serde(rename = "corpids")]
    pub corp_ids: Vec<String>,
}

/// A contact sharing rule inside a chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleInfo {
    pub owner_corp_range: OwnerCorpRange,
    pub member_corp_range: MemberCorpRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct RuleInfoResponse {
    pub rule_info: RuleInfo,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddRuleRequest<'a> {
    pub chain_id: &'a str,
    pub rule_info: &'a RuleInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct AddRuleResponse {
    pub rule_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ModifyRuleRequest<'a> {
    pub chain_id: &'a str,
    pub rule_id: i64,
    pub rule_info: &'a RuleInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Ack {}
