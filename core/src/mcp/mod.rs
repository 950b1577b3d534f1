/// Model Context Protocol (MCP) bridging
///
/// Connects to external MCP servers over HTTP and projects their
/// tools/resources/prompts into the local ability registry as proxy
/// abilities.
///
/// Architecture:
/// - `client`: JSON-RPC 2.0 HTTP client, eager connect + discovery
/// - `manager`: named directory of bridge clients, boot hooks, status
/// - `types`: wire types, auth material, bridge configuration
pub mod client;
pub mod manager;
pub mod types;

pub use client::McpClient;
pub use manager::{ClientStatus, McpClientManager};
pub use types::{AuthSpec, BridgeConfig, McpError, McpPrompt, McpResource, McpTool};
