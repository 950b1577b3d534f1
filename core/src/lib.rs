// Deckhand Core Library
// Ability registry and MCP bridging over a project-management store

pub mod abilities;
pub mod groups;
pub mod mcp;
pub mod servers;
pub mod store;

// Export core types
pub use abilities::{
    Ability, AbilityError, AbilityRegistry, AbilityResponse, AccessPolicy, Permission, Role,
    RolePolicy,
};
pub use mcp::{BridgeConfig, McpClient, McpClientManager, McpError};
pub use servers::{McpServerAdapter, ServerManifest};
pub use store::{MemoryStore, ProjectStore, StoreError};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckhandError {
    #[error("Ability error: {0}")]
    AbilityError(#[from] abilities::AbilityError),

    #[error("Store error: {0}")]
    StoreError(#[from] store::StoreError),

    #[error("Bridge error: {0}")]
    BridgeError(#[from] mcp::McpError),

    #[error("Adapter error: {0}")]
    AdapterError(#[from] servers::AdapterError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
pub type Result<T> = std::result::Result<T, DeckhandError>;

use std::sync::Arc;

/// Core runtime: one store, one registry, one bridge manager.
pub struct Deckhand {
    pub store: Arc<dyn ProjectStore>,
    pub registry: AbilityRegistry,
    pub bridges: Arc<McpClientManager>,
}

impl Deckhand {
    pub fn new(store: Arc<dyn ProjectStore>, policy: Arc<dyn AccessPolicy>) -> Self {
        let registry = AbilityRegistry::new(policy);
        let bridges = McpClientManager::new(registry.clone());
        Self {
            store,
            registry,
            bridges,
        }
    }

    /// Same as `new`, with a restrictive bridge permission policy.
    pub fn with_bridge_policy(
        store: Arc<dyn ProjectStore>,
        policy: Arc<dyn AccessPolicy>,
        bridge_policy: abilities::BridgePolicy,
    ) -> Self {
        let registry = AbilityRegistry::new(policy);
        let bridges = McpClientManager::with_policy(registry.clone(), bridge_policy);
        Self {
            store,
            registry,
            bridges,
        }
    }

    /// Boot sequence: native groups register first, then the bridge
    /// manager fires its init hooks (each bridge connects and projects
    /// its remote capabilities). Returns the native ability count.
    pub async fn start(&self) -> usize {
        tracing::info!("Starting deckhand runtime");

        let native = groups::register_native_groups(&self.registry, Arc::clone(&self.store));
        self.bridges.init().await;

        tracing::info!(
            native,
            total = self.registry.len(),
            "Deckhand runtime started"
        );
        native
    }
}
