/// Ability descriptor
///
/// An ability is a named, schema-described, permission-gated callable
/// unit. Native abilities run local logic against the project store;
/// remote abilities forward to an MCP bridge. The kind is a tagged
/// variant resolved by the registry at call time, so remote proxies
/// carry plain data (client handle + remote name) instead of captured
/// closures.
use super::error::AbilityResult;
use crate::mcp::client::McpClient;
use crate::mcp::types::{McpPrompt, McpResource, McpTool};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type NativeFuture = Pin<Box<dyn Future<Output = AbilityResult<Value>> + Send>>;
pub type NativeFn = Arc<dyn Fn(Value) -> NativeFuture + Send + Sync>;

/// Policy consulted before forwarding to a bridge. Seeded permissive:
/// the default allows every client id.
pub type BridgePolicy = Arc<dyn Fn(&str) -> bool + Send + Sync>;

pub fn allow_all_bridges() -> BridgePolicy {
    Arc::new(|_| true)
}

/// Wrap an async handler into the boxed form stored on the ability.
pub fn native_handler<F, Fut>(f: F) -> NativeFn
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AbilityResult<Value>> + Send + 'static,
{
    Arc::new(move |args| Box::pin(f(args)))
}

/// Gate evaluated by the registry before dispatch.
#[derive(Clone)]
pub enum Permission {
    /// No gate.
    Open,
    /// Read access; optionally refined by a resource id pulled from the
    /// call args under `resource_key`.
    View { resource_key: Option<&'static str> },
    /// Read+write access, same refinement rules as `View`.
    Manage { resource_key: Option<&'static str> },
    /// Remote proxy gate: the injected bridge policy decides per client id.
    Bridge {
        client_id: String,
        policy: BridgePolicy,
    },
}

impl Permission {
    pub fn view() -> Self {
        Permission::View { resource_key: None }
    }

    pub fn view_on(resource_key: &'static str) -> Self {
        Permission::View {
            resource_key: Some(resource_key),
        }
    }

    pub fn manage() -> Self {
        Permission::Manage { resource_key: None }
    }

    pub fn manage_on(resource_key: &'static str) -> Self {
        Permission::Manage {
            resource_key: Some(resource_key),
        }
    }
}

#[derive(Clone)]
pub enum AbilityKind {
    Native {
        /// Stable code reported in the error envelope when the handler fails.
        error_code: String,
        run: NativeFn,
    },
    RemoteTool {
        client: Arc<McpClient>,
        tool: String,
    },
    RemoteResource {
        client: Arc<McpClient>,
        uri: String,
    },
    RemotePrompt {
        client: Arc<McpClient>,
        prompt: String,
    },
}

#[derive(Clone)]
pub struct Ability {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub permission: Permission,
    pub kind: AbilityKind,
    pub metadata: HashMap<String, String>,
}

impl Ability {
    pub fn native(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        permission: Permission,
        error_code: impl Into<String>,
        run: NativeFn,
    ) -> Self {
        let name = name.into();
        let mut metadata = HashMap::new();
        if let Some(scope) = name.split('/').next() {
            metadata.insert("group".to_string(), scope.to_string());
        }
        Self {
            name,
            description: description.into(),
            input_schema,
            permission,
            kind: AbilityKind::Native {
                error_code: error_code.into(),
                run,
            },
            metadata,
        }
    }

    /// Proxy for a remote tool: `mcp_{client_id}/{tool_name}`.
    pub fn remote_tool(client: Arc<McpClient>, tool: &McpTool, policy: BridgePolicy) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("mcp_client".to_string(), client.id().to_string());
        metadata.insert("mcp_tool".to_string(), tool.name.clone());
        let schema = if tool.input_schema.is_null() {
            json!({})
        } else {
            tool.input_schema.clone()
        };
        Self {
            name: format!("mcp_{}/{}", client.id(), tool.name),
            description: tool.description.clone().unwrap_or_default(),
            input_schema: schema,
            permission: Permission::Bridge {
                client_id: client.id().to_string(),
                policy,
            },
            kind: AbilityKind::RemoteTool {
                client,
                tool: tool.name.clone(),
            },
            metadata,
        }
    }

    /// Proxy for a remote resource: `mcp_{client_id}/resource/{uri}`.
    /// Call args are ignored at dispatch; only the captured uri is used.
    pub fn remote_resource(
        client: Arc<McpClient>,
        resource: &McpResource,
        policy: BridgePolicy,
    ) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("mcp_client".to_string(), client.id().to_string());
        metadata.insert("mcp_resource".to_string(), resource.uri.clone());
        Self {
            name: format!("mcp_{}/resource/{}", client.id(), resource.uri),
            description: resource.description.clone().unwrap_or_default(),
            input_schema: json!({}),
            permission: Permission::Bridge {
                client_id: client.id().to_string(),
                policy,
            },
            kind: AbilityKind::RemoteResource {
                client,
                uri: resource.uri.clone(),
            },
            metadata,
        }
    }

    /// Proxy for a remote prompt: `mcp_{client_id}/prompt/{name}`.
    pub fn remote_prompt(client: Arc<McpClient>, prompt: &McpPrompt, policy: BridgePolicy) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("mcp_client".to_string(), client.id().to_string());
        metadata.insert("mcp_prompt".to_string(), prompt.name.clone());
        Self {
            name: format!("mcp_{}/prompt/{}", client.id(), prompt.name),
            description: prompt.description.clone().unwrap_or_default(),
            input_schema: prompt.arguments.clone().unwrap_or_else(|| json!({})),
            permission: Permission::Bridge {
                client_id: client.id().to_string(),
                policy,
            },
            kind: AbilityKind::RemotePrompt {
                client,
                prompt: prompt.name.clone(),
            },
            metadata,
        }
    }
}
