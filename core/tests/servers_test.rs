/// Integration tests for server assembly: manifests hand their ability
/// name lists to the external adapter, in order, without validation.
use async_trait::async_trait;
use deckhand_core::abilities::{AbilityRegistry, Role, RolePolicy};
use deckhand_core::groups::register_native_groups;
use deckhand_core::servers::{
    assemble, AdapterError, AllAbilitiesServer, BoardsServer, McpServerAdapter, ReportsServer,
    ServerAssembler, ServerManifest, TasksServer,
};
use deckhand_core::store::MemoryStore;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingAdapter {
    manifests: Mutex<Vec<ServerManifest>>,
}

#[async_trait]
impl McpServerAdapter for RecordingAdapter {
    async fn create_server(&self, manifest: ServerManifest) -> Result<(), AdapterError> {
        self.manifests.lock().unwrap().push(manifest);
        Ok(())
    }
}

struct RejectingAdapter;

#[async_trait]
impl McpServerAdapter for RejectingAdapter {
    async fn create_server(&self, manifest: ServerManifest) -> Result<(), AdapterError> {
        Err(AdapterError::Registration(manifest.server_id))
    }
}

/// Manifests reach the adapter in assembler order, name lists intact.
#[tokio::test]
async fn assemble_hands_manifests_in_order() {
    let registry = AbilityRegistry::new(Arc::new(RolePolicy::new(Role::Manager)));
    register_native_groups(&registry, Arc::new(MemoryStore::new()));

    let assemblers: Vec<Box<dyn ServerAssembler>> = vec![
        Box::new(BoardsServer),
        Box::new(TasksServer),
        Box::new(ReportsServer),
        Box::new(AllAbilitiesServer::new(registry)),
    ];

    let adapter = RecordingAdapter::default();
    let count = assemble(&adapter, &assemblers).await.unwrap();
    assert_eq!(count, 4);

    let manifests = adapter.manifests.lock().unwrap();
    let ids: Vec<_> = manifests.iter().map(|m| m.server_id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "deckhand-boards",
            "deckhand-tasks",
            "deckhand-reports",
            "deckhand-all"
        ]
    );

    // The curated list and the full catalog both name the create op.
    assert!(manifests[0]
        .ability_names
        .contains(&"boards/create".to_string()));
    assert!(manifests[3]
        .ability_names
        .contains(&"boards/create".to_string()));
    assert!(manifests[3].ability_names.len() > manifests[0].ability_names.len());
}

/// An adapter rejection propagates; assembly stops at the failure.
#[tokio::test]
async fn adapter_rejection_propagates() {
    let assemblers: Vec<Box<dyn ServerAssembler>> = vec![Box::new(BoardsServer)];
    let err = assemble(&RejectingAdapter, &assemblers).await.unwrap_err();
    assert!(err.to_string().contains("deckhand-boards"));
}
