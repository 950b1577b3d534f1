/// MCP protocol types
///
/// Based on the Model Context Protocol specification (JSON-RPC 2.0 over
/// HTTP POST). Only the client side of the wire is modeled here.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String, // always "2.0"
    pub id: Value,       // string or number
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Remote tool manifest entry (tools/list)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value, // JSON Schema
}

/// Remote resource manifest entry (resources/list)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResource {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Remote prompt manifest entry (prompts/list)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpPrompt {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// Authentication material resolved into HTTP headers per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthSpec {
    Bearer { token: String },
    ApiKey { key: String },
    Basic { username: String, password: String },
}

/// Per-bridge connection options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Request timeout in seconds for every round trip on this bridge.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub auth: Option<AuthSpec>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            auth: None,
        }
    }
}

/// MCP error types
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server error: {message}")]
    Server {
        message: String,
        /// Raw `error` object from the JSON-RPC response.
        detail: Value,
    },

    #[error("Timeout")]
    Timeout,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// Convert to error code string
    pub fn code(&self) -> &'static str {
        match self {
            McpError::Transport(_) => "TRANSPORT_ERROR",
            McpError::Protocol(_) => "PROTOCOL_ERROR",
            McpError::Server { .. } => "SERVER_ERROR",
            McpError::Timeout => "TIMEOUT",
            McpError::Json(_) => "JSON_ERROR",
        }
    }
}
