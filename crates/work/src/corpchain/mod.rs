//! Corp chain (upstream / downstream corp) API
//!
//! Calls about the chain itself (chain list, shared apps) authenticate as
//! the upstream corp through [`ParentTokenHandle`]; calls on behalf of a
//! downstream corp use the delegated chain token.

mod auth;
mod types;

use std::sync::Arc;

use wecom_common::credential::{CorpChainAccessToken, ParentTokenHandle};

use crate::context::Context;
use crate::error::WorkResult;

pub use auth::{Auth, TransferredSession};
use types::{
    Ack, AddRuleRequest, AddRuleResponse, ChainIdRequest, ChainList, ModifyRuleRequest,
    RuleIdList, RuleInfoResponse, RuleRequest, UnionidToExternalUseridRequest,
    UnionidToExternalUseridResponse,
};
pub use types::{
    Chain, ExternalUseridInfo, ListAppShareInfoRequest, ListAppShareInfoResponse,
    MemberCorpRange, OwnerCorpRange, RuleInfo, SharedCorp,
};

const LIST_APP_SHARE_INFO_PATH: &str = "/cgi-bin/corpgroup/corp/list_app_share_info";
const GET_CHAIN_LIST_PATH: &str = "/cgi-bin/corpgroup/corp/get_chain_list";
const UNIONID_TO_EXTERNAL_USERID_PATH: &str = "/cgi-bin/corpgroup/unionid_to_external_userid";
const RULE_LIST_IDS_PATH: &str = "/cgi-bin/corpgroup/rule/list_ids";
const RULE_DELETE_PATH: &str = "/cgi-bin/corpgroup/rule/delete_rule";
const RULE_GET_INFO_PATH: &str = "/cgi-bin/corpgroup/rule/get_rule_info";
const RULE_ADD_PATH: &str = "/cgi-bin/corpgroup/rule/add_rule";
const RULE_MODIFY_PATH: &str = "/cgi-bin/corpgroup/rule/modify_rule";

/// Corp chain client bound to one downstream corp
#[derive(Debug, Clone)]
pub struct CorpChain {
    context: Context,
    handle: Arc<CorpChainAccessToken>,
}

impl CorpChain {
    /// `context` must authenticate with `handle`.
    pub fn new(context: Context, handle: Arc<CorpChainAccessToken>) -> Self {
        Self { context, handle }
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[must_use]
    pub fn token_handle(&self) -> &Arc<CorpChainAccessToken> {
        &self.handle
    }

    /// Session exchange client for the downstream corp.
    #[must_use]
    pub fn auth(&self) -> Auth {
        Auth::new(self.context.clone())
    }

    /// Apps the upstream corp shares with downstream corps.
    ///
    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn list_app_share_info(
        &self,
        request: &ListAppShareInfoRequest,
    ) -> WorkResult<ListAppShareInfoResponse> {
        let token = self.handle.get_parent_access_token().await?;
        self.context.post_with_token(&token, LIST_APP_SHARE_INFO_PATH, &[], request).await
    }

    /// Chains the upstream corp belongs to.
    ///
    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn get_chain_list(&self) -> WorkResult<Vec<Chain>> {
        let token = self.handle.get_parent_access_token().await?;
        let list: ChainList = self.context.get_with_token(&token, GET_CHAIN_LIST_PATH, &[]).await?;
        Ok(list.chains)
    }

    /// Map a WeChat user's unionid/openid to downstream external user ids.
    ///
    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn unionid_to_external_userid(
        &self,
        unionid: &str,
        openid: &str,
        corp_id: &str,
    ) -> WorkResult<Vec<ExternalUseridInfo>> {
        let request = UnionidToExternalUseridRequest { unionid, openid, corp_id };
        let response: UnionidToExternalUseridResponse =
            self.context.post_api(UNIONID_TO_EXTERNAL_USERID_PATH, &[], &request).await?;
        Ok(response.external_userid_info)
    }

    /// Ids of the sharing rules of `chain_id`.
    ///
    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn rule_list_ids(&self, chain_id: &str) -> WorkResult<Vec<i64>> {
        let list: RuleIdList =
            self.context.post_api(RULE_LIST_IDS_PATH, &[], &ChainIdRequest { chain_id }).await?;
        Ok(list.rule_ids)
    }

    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn rule_get_rule_info(&self, chain_id: &str, rule_id: i64) -> WorkResult<RuleInfo> {
        let response: RuleInfoResponse = self
            .context
            .post_api(RULE_GET_INFO_PATH, &[], &RuleRequest { chain_id, rule_id })
            .await?;
        Ok(response.rule_info)
    }

    /// Add a sharing rule and return its id.
    ///
    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn rule_add_rule(&self, chain_id: &str, rule_info: &RuleInfo) -> WorkResult<i64> {
        let response: AddRuleResponse = self
            .context
            .post_api(RULE_ADD_PATH, &[], &AddRuleRequest { chain_id, rule_info })
            .await?;
        Ok(response.rule_id)
    }

    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn rule_modify_rule(
        &self,
        chain_id: &str,
        rule_id: i64,
        rule_info: &RuleInfo,
    ) -> WorkResult<()> {
        let _: Ack = self
            .context
            .post_api(RULE_MODIFY_PATH, &[], &ModifyRuleRequest { chain_id, rule_id, rule_info })
            .await?;
        Ok(())
    }

    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn rule_delete_rule(&self, chain_id: &str, rule_id: i64) -> WorkResult<()> {
        let _: Ack = self
            .context
            .post_api(RULE_DELETE_PATH, &[], &RuleRequest { chain_id, rule_id })
            .await?;
        Ok(())
    }
}
