/// Integration tests for the native ability groups: CRUD flows through
/// the registry, the availability guard and membership-refined
/// permissions.
use deckhand_core::abilities::{
    AbilityError, AbilityRegistry, MembershipPolicy, Role, RolePolicy,
};
use deckhand_core::groups::register_native_groups;
use deckhand_core::store::{MemberRole, MemoryStore, ProjectStore};
use serde_json::{json, Value};
use std::sync::Arc;

fn booted_registry(store: Arc<MemoryStore>) -> AbilityRegistry {
    let registry = AbilityRegistry::new(Arc::new(RolePolicy::new(Role::Manager)));
    register_native_groups(&registry, store);
    registry
}

fn data(envelope: &Value) -> &Value {
    assert_eq!(envelope["success"], json!(true), "envelope: {}", envelope);
    &envelope["data"]
}

/// Board → stage → task → comment → label flow, all through
/// registry.execute, all returning success envelopes.
#[tokio::test]
async fn crud_flow_through_registry() {
    let store = Arc::new(MemoryStore::new());
    let registry = booted_registry(Arc::clone(&store));

    let board = registry
        .execute("boards/create", json!({ "title": "Roadmap" }))
        .await
        .unwrap();
    let board_id = data(&board)["id"].as_str().unwrap().to_string();

    let stage = registry
        .execute(
            "stages/create",
            json!({ "board_id": board_id, "title": "Todo" }),
        )
        .await
        .unwrap();
    let stage_id = data(&stage)["id"].as_str().unwrap().to_string();

    let task = registry
        .execute(
            "tasks/create",
            json!({
                "board_id": board_id,
                "stage_id": stage_id,
                "title": "Ship it",
                "description": "Final pass"
            }),
        )
        .await
        .unwrap();
    let task_id = data(&task)["id"].as_str().unwrap().to_string();

    let author = store
        .create_user("Ada".into(), "ada@example.com".into())
        .await
        .unwrap();
    let comment = registry
        .execute(
            "comments/add",
            json!({ "task_id": task_id, "author_id": author.id, "body": "On it" }),
        )
        .await
        .unwrap();
    assert_eq!(data(&comment)["body"], json!("On it"));

    let label = registry
        .execute(
            "labels/create",
            json!({ "board_id": board_id, "name": "urgent", "color": "#ff0000" }),
        )
        .await
        .unwrap();
    let label_id = data(&label)["id"].as_str().unwrap().to_string();

    let assigned = registry
        .execute(
            "labels/assign",
            json!({ "task_id": task_id, "label_id": label_id }),
        )
        .await
        .unwrap();
    assert_eq!(data(&assigned)["labels"][0]["name"], json!("urgent"));

    let listed = registry
        .execute("tasks/list", json!({ "board_id": board_id }))
        .await
        .unwrap();
    assert_eq!(data(&listed)["count"], json!(1));

    let summary = registry
        .execute("reports/board_summary", json!({ "board_id": board_id }))
        .await
        .unwrap();
    assert_eq!(data(&summary)["total_tasks"], json!(1));
    assert_eq!(data(&summary)["done"], json!(0));
    assert_eq!(data(&summary)["stages"][0]["tasks"], json!(1));
}

/// Marking a task done and overdue handling show up in the summary.
#[tokio::test]
async fn board_summary_tracks_done_and_overdue() {
    let store = Arc::new(MemoryStore::new());
    let registry = booted_registry(Arc::clone(&store));

    let board = store.create_board("B".into(), String::new()).await.unwrap();
    let stage = store.create_stage(board.id, "Doing".into()).await.unwrap();
    let done_task = store
        .create_task(board.id, stage.id, "Done one".into(), String::new())
        .await
        .unwrap();
    let late_task = store
        .create_task(board.id, stage.id, "Late one".into(), String::new())
        .await
        .unwrap();

    registry
        .execute(
            "tasks/update",
            json!({ "task_id": done_task.id, "done": true }),
        )
        .await
        .unwrap();
    registry
        .execute(
            "tasks/update",
            json!({ "task_id": late_task.id, "due_at": "2001-01-01T00:00:00Z" }),
        )
        .await
        .unwrap();

    let summary = registry
        .execute("reports/board_summary", json!({ "board_id": board.id }))
        .await
        .unwrap();
    assert_eq!(data(&summary)["done"], json!(1));
    assert_eq!(data(&summary)["overdue"], json!(1));
}

/// Expected failures come back as error envelopes with stable codes,
/// never as raised errors.
#[tokio::test]
async fn expected_failures_use_the_envelope() {
    let store = Arc::new(MemoryStore::new());
    let registry = booted_registry(store);

    // Unknown board id: delegate fails, envelope reports it.
    let missing = registry
        .execute(
            "boards/get",
            json!({ "board_id": "00000000-0000-0000-0000-000000000000" }),
        )
        .await
        .unwrap();
    assert_eq!(missing["success"], json!(false));
    assert_eq!(missing["error"]["code"], json!("board_get_failed"));

    // Malformed arguments: validation fails, same envelope shape.
    let invalid = registry
        .execute("boards/get", json!({ "board_id": "not-a-uuid" }))
        .await
        .unwrap();
    assert_eq!(invalid["success"], json!(false));
    assert_eq!(invalid["error"]["code"], json!("board_get_failed"));
    assert!(!invalid["error"]["message"].as_str().unwrap().is_empty());
}

/// With the backing plugin absent, every group registers nothing and
/// construction stays quiet.
#[tokio::test]
async fn absent_backend_registers_no_abilities() {
    let registry = AbilityRegistry::new(Arc::new(RolePolicy::new(Role::Manager)));
    let count = register_native_groups(&registry, Arc::new(MemoryStore::unavailable()));

    assert_eq!(count, 0);
    assert!(registry.is_empty());
}

/// Membership refinement: a guest with a manager seat on one board can
/// manage that board only; board-less writes still fall back to the
/// coarse role and are denied.
#[tokio::test]
async fn membership_refinement_gates_per_board() {
    let store = Arc::new(MemoryStore::new());
    let board = store.create_board("B".into(), String::new()).await.unwrap();
    let other = store.create_board("O".into(), String::new()).await.unwrap();
    let user = store
        .create_user("Ada".into(), "ada@example.com".into())
        .await
        .unwrap();
    store
        .add_member(board.id, user.id, MemberRole::Manager)
        .await
        .unwrap();

    let policy = Arc::new(MembershipPolicy::new(
        store.clone() as Arc<dyn ProjectStore>,
        user.id,
        Role::Guest,
    ));
    let registry = AbilityRegistry::new(policy);
    register_native_groups(&registry, store);

    // Manager seat on `board` lets the update through.
    let ok = registry
        .execute(
            "boards/update",
            json!({ "board_id": board.id, "title": "Mine" }),
        )
        .await
        .unwrap();
    assert_eq!(ok["success"], json!(true));

    // No seat on `other`: coarse guest fallback denies.
    let err = registry
        .execute(
            "boards/update",
            json!({ "board_id": other.id, "title": "Not mine" }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AbilityError::PermissionDenied(_)));

    // Board-less create: no refinement available, guest denied.
    let err = registry
        .execute("boards/create", json!({ "title": "New" }))
        .await
        .unwrap_err();
    assert!(matches!(err, AbilityError::PermissionDenied(_)));
}
