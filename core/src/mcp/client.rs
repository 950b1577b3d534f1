/// MCP bridge client
///
/// Owns one outbound HTTP connection to an MCP server. Construction is
/// eager: `connect` performs the `initialize` round trip immediately and
/// never fails — a dead server is observable only through
/// `is_connected()` and a logged diagnostic. On success the remote
/// tools/resources/prompts are discovered and projected into the local
/// ability registry as proxy abilities.
use super::types::{
    AuthSpec, BridgeConfig, JsonRpcRequest, McpError, McpPrompt, McpResource, McpTool,
};
use crate::abilities::{Ability, AbilityRegistry, BridgePolicy};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub struct McpClient {
    id: String,
    server_url: String,
    config: BridgeConfig,
    http: reqwest::Client,
    /// Request ID counter
    request_id: AtomicU64,
    connected: AtomicBool,
    /// Raw capabilities object announced by the remote `initialize`.
    capabilities: RwLock<Value>,
    session_id: RwLock<Option<String>>,
    registry: AbilityRegistry,
    bridge_policy: BridgePolicy,
}

impl McpClient {
    /// Build a client and immediately attempt the connection. The
    /// returned instance is usable either way; callers check
    /// `is_connected()` to learn the outcome.
    pub async fn connect(
        id: impl Into<String>,
        server_url: impl Into<String>,
        config: BridgeConfig,
        registry: AbilityRegistry,
        bridge_policy: BridgePolicy,
    ) -> Arc<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let client = Arc::new(Self {
            id: id.into(),
            server_url: server_url.into(),
            config,
            http,
            request_id: AtomicU64::new(1),
            connected: AtomicBool::new(false),
            capabilities: RwLock::new(Value::Null),
            session_id: RwLock::new(None),
            registry,
            bridge_policy,
        });

        if client.initialize().await {
            Self::register_remote_abilities(&client).await;
        }

        client
    }

    /// Send `initialize` and record the announced session state.
    /// Returns false on any failure; nothing propagates out.
    async fn initialize(&self) -> bool {
        info!(
            target: "mcp_client",
            client = %self.id,
            url = %self.server_url,
            "Connecting to MCP server"
        );

        match self.send_request("initialize", json!({})).await {
            Ok(result) => {
                *self.capabilities.write().await = result
                    .get("capabilities")
                    .cloned()
                    .unwrap_or_else(|| json!({}));
                *self.session_id.write().await = result
                    .get("sessionId")
                    .and_then(Value::as_str)
                    .map(String::from);
                self.connected.store(true, Ordering::SeqCst);

                info!(
                    target: "mcp_client",
                    client = %self.id,
                    "MCP server connected and initialized"
                );
                true
            }
            Err(e) => {
                warn!(
                    target: "mcp_client",
                    client = %self.id,
                    url = %self.server_url,
                    error = %e,
                    "Connection failed"
                );
                false
            }
        }
    }

    /// Discover remote tools, resources and prompts and register a proxy
    /// ability for each. A discovery class that fails contributes zero
    /// proxies without failing the others.
    async fn register_remote_abilities(client: &Arc<Self>) {
        match client.list_tools().await {
            Ok(tools) => {
                for tool in &tools {
                    client.registry.register(Ability::remote_tool(
                        Arc::clone(client),
                        tool,
                        Arc::clone(&client.bridge_policy),
                    ));
                }
                debug!(target: "mcp_client", client = %client.id, count = tools.len(), "Registered tool proxies");
            }
            Err(e) => {
                warn!(target: "mcp_client", client = %client.id, error = %e, "Tool discovery failed; no tool proxies registered");
            }
        }

        match client.list_resources().await {
            Ok(resources) => {
                for resource in &resources {
                    client.registry.register(Ability::remote_resource(
                        Arc::clone(client),
                        resource,
                        Arc::clone(&client.bridge_policy),
                    ));
                }
                debug!(target: "mcp_client", client = %client.id, count = resources.len(), "Registered resource proxies");
            }
            Err(e) => {
                warn!(target: "mcp_client", client = %client.id, error = %e, "Resource discovery failed; no resource proxies registered");
            }
        }

        match client.list_prompts().await {
            Ok(prompts) => {
                for prompt in &prompts {
                    client.registry.register(Ability::remote_prompt(
                        Arc::clone(client),
                        prompt,
                        Arc::clone(&client.bridge_policy),
                    ));
                }
                debug!(target: "mcp_client", client = %client.id, count = prompts.len(), "Registered prompt proxies");
            }
            Err(e) => {
                warn!(target: "mcp_client", client = %client.id, error = %e, "Prompt discovery failed; no prompt proxies registered");
            }
        }
    }

    /// List available tools
    pub async fn list_tools(&self) -> Result<Vec<McpTool>, McpError> {
        let result = self.send_request("tools/list", json!({})).await?;
        serde_json::from_value(result.get("tools").cloned().unwrap_or_else(|| json!([])))
            .map_err(|e| McpError::Protocol(format!("Invalid tools/list result: {}", e)))
    }

    /// List available resources
    pub async fn list_resources(&self) -> Result<Vec<McpResource>, McpError> {
        let result = self.send_request("resources/list", json!({})).await?;
        serde_json::from_value(result.get("resources").cloned().unwrap_or_else(|| json!([])))
            .map_err(|e| McpError::Protocol(format!("Invalid resources/list result: {}", e)))
    }

    /// List available prompts
    pub async fn list_prompts(&self) -> Result<Vec<McpPrompt>, McpError> {
        let result = self.send_request("prompts/list", json!({})).await?;
        serde_json::from_value(result.get("prompts").cloned().unwrap_or_else(|| json!([])))
            .map_err(|e| McpError::Protocol(format!("Invalid prompts/list result: {}", e)))
    }

    /// Invoke a remote tool. Not gated on connection state.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, McpError> {
        debug!(target: "mcp_client", client = %self.id, tool = %name, "Calling tool");
        self.send_request("tools/call", json!({"name": name, "arguments": arguments}))
            .await
    }

    /// Read a remote resource. Not gated on connection state.
    pub async fn read_resource(&self, uri: &str) -> Result<Value, McpError> {
        debug!(target: "mcp_client", client = %self.id, uri = %uri, "Reading resource");
        self.send_request("resources/read", json!({"uri": uri})).await
    }

    /// Fetch a remote prompt. Not gated on connection state.
    pub async fn get_prompt(&self, name: &str, arguments: Value) -> Result<Value, McpError> {
        debug!(target: "mcp_client", client = %self.id, prompt = %name, "Fetching prompt");
        self.send_request("prompts/get", json!({"name": name, "arguments": arguments}))
            .await
    }

    /// Send a JSON-RPC request and return the `result` value.
    ///
    /// Transport failure or an `error` member in the response body both
    /// surface as `McpError`; a success with no `result` yields an empty
    /// object.
    async fn send_request(&self, method: &str, params: Value) -> Result<Value, McpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: json!(id),
            method: method.to_string(),
            params: Some(params),
        };

        let mut builder = self.http.post(&self.server_url).json(&request);
        for (name, value) in auth_headers(&self.config.auth) {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!(target: "mcp_client", client = %self.id, method = %method, "Request timeout");
                McpError::Timeout
            } else {
                McpError::Transport(format!("Request failed: {}", e))
            }
        })?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| McpError::Protocol(format!("Invalid JSON-RPC body: {}", e)))?;

        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            return Err(McpError::Server {
                message,
                detail: error.clone(),
            });
        }

        Ok(body.get("result").cloned().unwrap_or_else(|| json!({})))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Raw capabilities announced by the remote server, `Null` before a
    /// successful connect.
    pub async fn capabilities(&self) -> Value {
        self.capabilities.read().await.clone()
    }

    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }
}

/// Resolve auth material into request headers. Absent auth adds nothing.
fn auth_headers(auth: &Option<AuthSpec>) -> Vec<(&'static str, String)> {
    match auth {
        Some(AuthSpec::Bearer { token }) => {
            vec![("Authorization", format!("Bearer {}", token))]
        }
        Some(AuthSpec::ApiKey { key }) => vec![("X-API-Key", key.clone())],
        Some(AuthSpec::Basic { username, password }) => {
            let encoded = BASE64.encode(format!("{}:{}", username, password));
            vec![("Authorization", format!("Basic {}", encoded))]
        }
        None => Vec::new(),
    }
}
