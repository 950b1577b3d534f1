/// Integration tests for the bridge manager: duplicate refusal, failed
/// connects, boot hooks, live status counts and the bridge permission
/// policy.
mod common;

use common::{init_result, spawn_failing_stub, spawn_stub};
use deckhand_core::abilities::{AbilityError, AbilityRegistry, BridgePolicy, Role, RolePolicy};
use deckhand_core::mcp::{BridgeConfig, McpClientManager};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn registry() -> AbilityRegistry {
    AbilityRegistry::new(Arc::new(RolePolicy::new(Role::Manager)))
}

fn stub_with_tool_count(count: Arc<AtomicUsize>) -> common::Responder {
    Arc::new(move |method, _params, _headers| match method {
        "initialize" => Ok(init_result()),
        "tools/list" => {
            let n = count.load(Ordering::SeqCst);
            let tools: Vec<_> = (0..n).map(|i| json!({ "name": format!("t{}", i) })).collect();
            Ok(json!({ "tools": tools }))
        }
        "resources/list" => Ok(json!({ "resources": [] })),
        "prompts/list" => Ok(json!({ "prompts": [] })),
        _ => Err(json!({ "message": "unknown" })),
    })
}

/// The first registration of a client id wins; a second create with the
/// same id is refused and the stored session is unchanged.
#[tokio::test]
async fn duplicate_client_id_refused() {
    let count = Arc::new(AtomicUsize::new(1));
    let url1 = spawn_stub(stub_with_tool_count(Arc::clone(&count))).await;
    let url2 = spawn_stub(stub_with_tool_count(Arc::clone(&count))).await;

    let manager = McpClientManager::new(registry());

    let first = manager
        .create_client("k", &url1, BridgeConfig::default())
        .await;
    assert!(first.is_some());

    let second = manager
        .create_client("k", &url2, BridgeConfig::default())
        .await;
    assert!(second.is_none());

    let stored = manager.get_client("k").await.unwrap();
    assert_eq!(stored.server_url(), url1);
}

/// A failed connect is not stored and not remembered: the same id can
/// be retried and succeed later.
#[tokio::test]
async fn failed_connect_not_stored_and_retryable() {
    let bad = spawn_failing_stub("bad auth").await;

    let manager = McpClientManager::new(registry());
    let client = manager
        .create_client("svc", &bad, BridgeConfig::default())
        .await;
    assert!(client.is_none());
    assert!(!manager.has_client("svc").await);
    assert!(manager.get_clients().await.is_empty());

    // Retry with the same id against a healthy server is permitted.
    let good = spawn_stub(stub_with_tool_count(Arc::new(AtomicUsize::new(2)))).await;
    let client = manager
        .create_client("svc", &good, BridgeConfig::default())
        .await;
    assert!(client.is_some());
    assert!(manager.has_client("svc").await);
}

/// Status counts are recomputed from fresh discovery calls: a shrinking
/// remote catalog is reflected without any re-registration.
#[tokio::test]
async fn status_reflects_live_counts() {
    let count = Arc::new(AtomicUsize::new(3));
    let url = spawn_stub(stub_with_tool_count(Arc::clone(&count))).await;

    let registry = registry();
    let manager = McpClientManager::new(registry.clone());
    manager
        .create_client("svc", &url, BridgeConfig::default())
        .await
        .unwrap();

    // Three proxies were registered at connect time.
    assert_eq!(
        registry
            .names()
            .iter()
            .filter(|n| n.starts_with("mcp_svc/"))
            .count(),
        3
    );

    let status = manager.get_client_status().await;
    assert_eq!(status["svc"].tools, 3);
    assert!(status["svc"].connected);
    assert_eq!(status["svc"].url, url);

    // The remote catalog shrinks; status follows, registration does not.
    count.store(1, Ordering::SeqCst);
    let status = manager.get_client_status().await;
    assert_eq!(status["svc"].tools, 1);
    assert_eq!(
        registry
            .names()
            .iter()
            .filter(|n| n.starts_with("mcp_svc/"))
            .count(),
        3
    );
}

/// Boot hooks fire once, in registration order, and reach the manager.
#[tokio::test]
async fn init_hooks_create_clients_in_order() {
    let url = spawn_stub(stub_with_tool_count(Arc::new(AtomicUsize::new(1)))).await;

    let manager = McpClientManager::new(registry());

    let hook_url = url.clone();
    manager
        .on_init(move |m| async move {
            m.create_client("first", &hook_url, BridgeConfig::default())
                .await;
        })
        .await;

    let hook_url = url.clone();
    manager
        .on_init(move |m| async move {
            // Registered second; by now "first" must already be stored.
            assert!(m.has_client("first").await);
            m.create_client("second", &hook_url, BridgeConfig::default())
                .await;
        })
        .await;

    manager.init().await;
    assert!(manager.has_client("first").await);
    assert!(manager.has_client("second").await);
}

/// A restrictive bridge policy turns proxy execution into a permission
/// failure while other clients stay callable.
#[tokio::test]
async fn bridge_policy_gates_proxy_execution() {
    let url = spawn_stub(Arc::new(|method, _params, _headers| match method {
        "initialize" => Ok(init_result()),
        "tools/list" => Ok(json!({ "tools": [{ "name": "search" }] })),
        "resources/list" => Ok(json!({ "resources": [] })),
        "prompts/list" => Ok(json!({ "prompts": [] })),
        "tools/call" => Ok(json!({ "ok": true })),
        _ => Err(json!({ "message": "unknown" })),
    }))
    .await;

    let registry = registry();
    let policy: BridgePolicy = Arc::new(|client_id: &str| client_id != "blocked");
    let manager = McpClientManager::with_policy(registry.clone(), policy);

    manager
        .create_client("blocked", &url, BridgeConfig::default())
        .await
        .unwrap();
    manager
        .create_client("open", &url, BridgeConfig::default())
        .await
        .unwrap();

    let err = registry
        .execute("mcp_blocked/search", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, AbilityError::PermissionDenied(_)));

    let ok = registry.execute("mcp_open/search", json!({})).await.unwrap();
    assert_eq!(ok, json!({ "ok": true }));
}
