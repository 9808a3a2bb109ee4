//! Integration tests for the corp chain client
//!
//! Checks which credential each corp chain call authenticates with: chain
//! level calls use the upstream corp token, downstream calls the delegated
//! token obtained by exchanging it.

use std::sync::Arc;

use wecom_common::cache::{CacheStore, MemoryCacheStore};
use wecom_common::credential::CredentialError;
use wecom_common::testing::RecordingCacheStore;
use wecom_work::corpchain::{CorpChain, ListAppShareInfoRequest, RuleInfo};
use wecom_work::{Work, WorkConfig, WorkError};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CORP_TOKEN_PATH: &str = "/cgi-bin/gettoken";
const CHAIN_TOKEN_PATH: &str = "/cgi-bin/corpgroup/corp/gettoken";

fn ok(body: serde_json::Value) -> ResponseTemplate {
    let mut envelope = serde_json::json!({"errcode": 0, "errmsg": "ok"});
    if let (Some(target), serde_json::Value::Object(fields)) = (envelope.as_object_mut(), body) {
        target.extend(fields);
    }
    ResponseTemplate::new(200).set_body_json(envelope)
}

/// Mounts the parent token (`P1`) and the delegated exchange (`C1`).
async fn mount_tokens(server: &MockServer, parent_calls: u64, chain_calls: u64) {
    Mock::given(method("GET"))
        .and(path(CORP_TOKEN_PATH))
        .and(query_param("corpid", "ww-parent"))
        .respond_with(ok(serde_json::json!({"access_token": "P1", "expires_in": 7200})))
        .expect(parent_calls)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAIN_TOKEN_PATH))
        .and(query_param("access_token", "P1"))
        .and(body_json(serde_json::json!({
            "corpid": "ww-child",
            "business_type": 1,
            "agentid": 1000002
        })))
        .respond_with(ok(serde_json::json!({"access_token": "C1", "expires_in": 7200})))
        .expect(chain_calls)
        .mount(server)
        .await;
}

fn work_for(server: &MockServer, store: Arc<dyn CacheStore>) -> Work {
    let config = WorkConfig::new("ww-parent", "parent-secret").with_qyapi_domain(server.uri());
    Work::new(config, Some(store)).expect("work client")
}

fn chain_for(work: &Work) -> CorpChain {
    work.corp_chain("ww-child", 1_000_002, 1).expect("corp chain client")
}

/// Chain level calls authenticate as the upstream corp and never trigger
/// the delegated exchange.
#[tokio::test]
async fn test_chain_list_uses_parent_token() {
    let server = MockServer::start().await;
    mount_tokens(&server, 1, 0).await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/corpgroup/corp/get_chain_list"))
        .and(query_param("access_token", "P1"))
        .respond_with(ok(serde_json::json!({
            "chains": [{"chain_id": "Chxxxxxx", "chain_name": "Retail"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let chain = chain_for(&work_for(&server, Arc::new(RecordingCacheStore::new())));
    let chains = chain.get_chain_list().await.unwrap();

    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].chain_name, "Retail");
}

#[tokio::test]
async fn test_list_app_share_info_uses_parent_token() {
    let server = MockServer::start().await;
    mount_tokens(&server, 1, 0).await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/corpgroup/corp/list_app_share_info"))
        .and(query_param("access_token", "P1"))
        .and(body_json(serde_json::json!({"agentid": 1000002, "limit": 100})))
        .respond_with(ok(serde_json::json!({
            "ending": 1,
            "corp_list": [{"corpid": "ww-child", "corp_name": "Branch", "agentid": 1000003}],
            "next_cursor": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let chain = chain_for(&work_for(&server, Arc::new(RecordingCacheStore::new())));
    let request = ListAppShareInfoRequest {
        agent_id: Some(1_000_002),
        limit: Some(100),
        ..ListAppShareInfoRequest::default()
    };
    let response = chain.list_app_share_info(&request).await.unwrap();

    assert_eq!(response.ending, 1);
    assert_eq!(response.corp_list[0].corp_id, "ww-child");
    assert_eq!(response.corp_list[0].agent_id, 1_000_003);
}

/// Downstream calls exchange the parent token once and reuse the delegated
/// token afterwards.
///
/// # Test Steps
/// 1. Provider issues `P1` and exchanges it for `C1`
/// 2. Call `rule_list_ids` twice
/// 3. Verify both calls carry `C1`, one exchange happened and both
///    credentials are cached under their own keys
#[tokio::test]
async fn test_downstream_calls_use_delegated_token() {
    let server = MockServer::start().await;
    mount_tokens(&server, 1, 1).await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/corpgroup/rule/list_ids"))
        .and(query_param("access_token", "C1"))
        .and(body_json(serde_json::json!({"chain_id": "Chxxxxxx"})))
        .respond_with(ok(serde_json::json!({"rule_ids": [1, 2]})))
        .expect(2)
        .mount(&server)
        .await;

    let store = Arc::new(RecordingCacheStore::new());
    let work = work_for(&server, store.clone());
    let chain = chain_for(&work);

    assert_eq!(chain.rule_list_ids("Chxxxxxx").await.unwrap(), vec![1, 2]);
    assert_eq!(chain.rule_list_ids("Chxxxxxx").await.unwrap(), vec![1, 2]);

    let chain_key = chain.token_handle().cache_key();
    assert_eq!(chain_key, "gowechat_work__chain_access_token_ww-child_1000002");
    assert_eq!(store.recorded_keys(), vec![work.access_token().cache_key(), chain_key]);
}

#[tokio::test]
async fn test_rule_lifecycle_round_trips_through_provider() {
    let server = MockServer::start().await;
    mount_tokens(&server, 1, 1).await;

    let rule = RuleInfo {
        owner_corp_range: wecom_work::corpchain::OwnerCorpRange {
            department_ids: vec!["1".into()],
            user_ids: vec!["zhangsan".into()],
        },
        member_corp_range: wecom_work::corpchain::MemberCorpRange {
            group_ids: vec![],
            corp_ids: vec!["ww-child".into()],
        },
    };
    let rule_json = serde_json::to_value(&rule).unwrap();

    Mock::given(method("POST"))
        .and(path("/cgi-bin/corpgroup/rule/add_rule"))
        .and(query_param("access_token", "C1"))
        .and(body_json(serde_json::json!({"chain_id": "Ch1", "rule_info": rule_json})))
        .respond_with(ok(serde_json::json!({"rule_id": 7})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/corpgroup/rule/get_rule_info"))
        .and(body_json(serde_json::json!({"chain_id": "Ch1", "rule_id": 7})))
        .respond_with(ok(serde_json::json!({"rule_info": rule_json})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/corpgroup/rule/modify_rule"))
        .and(body_json(serde_json::json!({"chain_id": "Ch1", "rule_id": 7, "rule_info": rule_json})))
        .respond_with(ok(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/corpgroup/rule/delete_rule"))
        .and(body_json(serde_json::json!({"chain_id": "Ch1", "rule_id": 7})))
        .respond_with(ok(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let chain = chain_for(&work_for(&server, Arc::new(RecordingCacheStore::new())));

    let rule_id = chain.rule_add_rule("Ch1", &rule).await.unwrap();
    assert_eq!(rule_id, 7);
    assert_eq!(chain.rule_get_rule_info("Ch1", rule_id).await.unwrap(), rule);
    chain.rule_modify_rule("Ch1", rule_id, &rule).await.unwrap();
    chain.rule_delete_rule("Ch1", rule_id).await.unwrap();
}

#[tokio::test]
async fn test_unionid_mapping_uses_delegated_token() {
    let server = MockServer::start().await;
    mount_tokens(&server, 1, 1).await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/corpgroup/unionid_to_external_userid"))
        .and(query_param("access_token", "C1"))
        .and(body_json(serde_json::json!({
            "unionid": "oAAAAAAA",
            "openid": "oBBBBB",
            "corpid": "ww-child"
        })))
        .respond_with(ok(serde_json::json!({
            "external_userid_info": [{"corpid": "ww-child", "external_userid": "wmAAAA"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let chain = chain_for(&work_for(&server, Arc::new(RecordingCacheStore::new())));
    let infos = chain.unionid_to_external_userid("oAAAAAAA", "oBBBBB", "ww-child").await.unwrap();

    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].external_userid, "wmAAAA");
}

#[tokio::test]
async fn test_transfer_session_uses_delegated_token() {
    let server = MockServer::start().await;
    mount_tokens(&server, 1, 1).await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/miniprogram/transfer_session"))
        .and(query_param("access_token", "C1"))
        .and(body_json(serde_json::json!({"userid": "wmAAAA", "session_key": "upstream"})))
        .respond_with(ok(serde_json::json!({"userid": "zhangsan", "session_key": "downstream"})))
        .expect(1)
        .mount(&server)
        .await;

    let chain = chain_for(&work_for(&server, Arc::new(RecordingCacheStore::new())));
    let session = chain.auth().transfer_session("wmAAAA", "upstream").await.unwrap();

    assert_eq!(session.user_id, "zhangsan");
    assert_eq!(session.session_key, "downstream");
}

/// A rejected exchange surfaces the provider code and the downstream call
/// is never sent.
#[tokio::test]
async fn test_rejected_exchange_aborts_downstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CORP_TOKEN_PATH))
        .respond_with(ok(serde_json::json!({"access_token": "P1", "expires_in": 7200})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAIN_TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": 60020,
            "errmsg": "not allow to access from your ip"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/corpgroup/rule/list_ids"))
        .respond_with(ok(serde_json::json!({"rule_ids": []})))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(RecordingCacheStore::new());
    let work = work_for(&server, store.clone());
    let err = chain_for(&work).rule_list_ids("Ch1").await.unwrap_err();

    assert_eq!(
        err,
        WorkError::Credential(CredentialError::provider(60020, "not allow to access from your ip"))
    );
    assert_eq!(store.recorded_keys(), vec![work.access_token().cache_key()]);
}

/// The chain client shares its parent's cache: a parent token cached
/// earlier is used for the exchange without a new parent refresh.
#[tokio::test]
async fn test_exchange_reuses_parent_token_cached_by_work_client() {
    let server = MockServer::start().await;
    mount_tokens(&server, 1, 1).await;

    let store = Arc::new(RecordingCacheStore::new());
    let work = work_for(&server, store.clone());
    assert_eq!(work.context().access_token().await.unwrap(), "P1");

    let chain = chain_for(&work);
    assert_eq!(chain.context().access_token().await.unwrap(), "C1");
}

#[test]
fn test_chain_client_requires_chain_corp_id() {
    let work = Work::new(
        WorkConfig::new("ww-parent", "parent-secret"),
        Some(Arc::new(MemoryCacheStore::new())),
    )
    .unwrap();

    let err = work.corp_chain("", 1, 0).unwrap_err();
    assert!(matches!(err, WorkError::Credential(CredentialError::Configuration { .. })));
}
