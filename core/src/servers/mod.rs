/// Server assemblers
///
/// An assembler is a static manifest: it maps a server identity (id,
/// route, name, transport) to a curated list of ability names and hands
/// the whole thing to an external MCP server adapter. Transport, error
/// handling and observability live behind the adapter; nothing here
/// validates that the named abilities exist — that contract belongs to
/// the adapter at assembly time.
pub mod assemblers;

pub use assemblers::{AllAbilitiesServer, BoardsServer, ReportsServer, TasksServer};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Http,
    Sse,
}

/// Static description of one exposed server. Consumed once by the
/// adapter; never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerManifest {
    pub server_id: String,
    pub route_namespace: String,
    pub route: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub transports: Vec<TransportKind>,
    pub ability_names: Vec<String>,
    /// Optional resource/prompt surfaces; most servers expose none.
    #[serde(default)]
    pub resource_names: Vec<String>,
    #[serde(default)]
    pub prompt_names: Vec<String>,
}

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Server registration failed: {0}")]
    Registration(String),
}

/// External MCP server machinery. This crate supplies manifests only.
#[async_trait]
pub trait McpServerAdapter: Send + Sync {
    async fn create_server(&self, manifest: ServerManifest) -> Result<(), AdapterError>;
}

/// Assembler contract: produce the manifest for one server.
pub trait ServerAssembler: Send + Sync {
    fn manifest(&self) -> ServerManifest;
}

/// Hand each assembler's manifest to the adapter, in order.
pub async fn assemble(
    adapter: &dyn McpServerAdapter,
    assemblers: &[Box<dyn ServerAssembler>],
) -> Result<usize, AdapterError> {
    let mut count = 0;
    for assembler in assemblers {
        let manifest = assembler.manifest();
        info!(
            target: "server_assembler",
            server = %manifest.server_id,
            abilities = manifest.ability_names.len(),
            "Registering server manifest"
        );
        adapter.create_server(manifest).await?;
        count += 1;
    }
    Ok(count)
}
