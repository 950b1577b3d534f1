/// Concrete server manifests
///
/// Fixed curated name lists, except `AllAbilitiesServer` which reads
/// the live registry through its public accessor.
use super::{ServerAssembler, ServerManifest, TransportKind};
use crate::abilities::AbilityRegistry;

const MANIFEST_VERSION: &str = env!("CARGO_PKG_VERSION");

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Board and stage management surface.
pub struct BoardsServer;

impl ServerAssembler for BoardsServer {
    fn manifest(&self) -> ServerManifest {
        ServerManifest {
            server_id: "deckhand-boards".to_string(),
            route_namespace: "deckhand/v1".to_string(),
            route: "/mcp/boards".to_string(),
            name: "Deckhand Boards".to_string(),
            description: "Board and stage management abilities".to_string(),
            version: MANIFEST_VERSION.to_string(),
            transports: vec![TransportKind::Http],
            ability_names: names(&[
                "boards/create",
                "boards/list",
                "boards/get",
                "boards/update",
                "boards/delete",
                "stages/create",
                "stages/list",
                "stages/reorder",
                "stages/delete",
            ]),
            resource_names: Vec::new(),
            prompt_names: Vec::new(),
        }
    }
}

/// Task-centric surface: tasks plus their comments, labels and
/// attachments.
pub struct TasksServer;

impl ServerAssembler for TasksServer {
    fn manifest(&self) -> ServerManifest {
        ServerManifest {
            server_id: "deckhand-tasks".to_string(),
            route_namespace: "deckhand/v1".to_string(),
            route: "/mcp/tasks".to_string(),
            name: "Deckhand Tasks".to_string(),
            description: "Task management abilities".to_string(),
            version: MANIFEST_VERSION.to_string(),
            transports: vec![TransportKind::Http],
            ability_names: names(&[
                "tasks/create",
                "tasks/get",
                "tasks/list",
                "tasks/update",
                "tasks/move",
                "tasks/delete",
                "comments/add",
                "comments/list",
                "comments/delete",
                "labels/assign",
                "labels/unassign",
                "attachments/add",
                "attachments/list",
                "attachments/delete",
            ]),
            resource_names: Vec::new(),
            prompt_names: Vec::new(),
        }
    }
}

/// Read-only reporting surface.
pub struct ReportsServer;

impl ServerAssembler for ReportsServer {
    fn manifest(&self) -> ServerManifest {
        ServerManifest {
            server_id: "deckhand-reports".to_string(),
            route_namespace: "deckhand/v1".to_string(),
            route: "/mcp/reports".to_string(),
            name: "Deckhand Reports".to_string(),
            description: "Read-only reporting abilities".to_string(),
            version: MANIFEST_VERSION.to_string(),
            transports: vec![TransportKind::Http],
            ability_names: names(&["reports/board_summary", "reports/workload"]),
            resource_names: Vec::new(),
            prompt_names: Vec::new(),
        }
    }
}

/// Everything currently registered, native and bridged alike. The name
/// list is read from the registry at manifest time, so the exposure
/// tracks whatever has been registered by then.
pub struct AllAbilitiesServer {
    registry: AbilityRegistry,
}

impl AllAbilitiesServer {
    pub fn new(registry: AbilityRegistry) -> Self {
        Self { registry }
    }
}

impl ServerAssembler for AllAbilitiesServer {
    fn manifest(&self) -> ServerManifest {
        ServerManifest {
            server_id: "deckhand-all".to_string(),
            route_namespace: "deckhand/v1".to_string(),
            route: "/mcp/all".to_string(),
            name: "Deckhand".to_string(),
            description: "Every registered ability".to_string(),
            version: MANIFEST_VERSION.to_string(),
            transports: vec![TransportKind::Http],
            ability_names: self.registry.names(),
            resource_names: Vec::new(),
            prompt_names: Vec::new(),
        }
    }
}
