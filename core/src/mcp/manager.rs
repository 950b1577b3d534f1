/// MCP bridge manager
///
/// Process-wide directory of named bridge clients. Responsible for:
/// - Creating eagerly-connecting clients, first registration wins
/// - Refusing duplicate client ids and forgetting failed connects
/// - Firing boot hooks so external code can register its bridges
/// - Aggregating live status (fresh discovery calls, not cached counts)
use super::client::McpClient;
use super::types::BridgeConfig;
use crate::abilities::{allow_all_bridges, AbilityRegistry, BridgePolicy};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

type InitHook =
    Box<dyn FnOnce(Arc<McpClientManager>) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Live status of one stored bridge.
#[derive(Debug, Clone, Serialize)]
pub struct ClientStatus {
    pub id: String,
    pub url: String,
    pub connected: bool,
    pub capabilities: Value,
    pub tools: usize,
    pub resources: usize,
    pub prompts: usize,
}

pub struct McpClientManager {
    /// Stored clients: client_id -> client. Only connected clients land here.
    clients: RwLock<HashMap<String, Arc<McpClient>>>,
    registry: AbilityRegistry,
    /// Permission policy consulted by every proxy ability. Seeded
    /// permissive; injected here so a host can restrict per client id.
    bridge_policy: BridgePolicy,
    init_hooks: Mutex<Vec<InitHook>>,
    initialized: AtomicBool,
    /// Self-handle passed to boot hooks.
    me: Weak<McpClientManager>,
}

impl McpClientManager {
    pub fn new(registry: AbilityRegistry) -> Arc<Self> {
        Self::with_policy(registry, allow_all_bridges())
    }

    pub fn with_policy(registry: AbilityRegistry, bridge_policy: BridgePolicy) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            clients: RwLock::new(HashMap::new()),
            registry,
            bridge_policy,
            init_hooks: Mutex::new(Vec::new()),
            initialized: AtomicBool::new(false),
            me: me.clone(),
        })
    }

    /// Queue a boot hook. Hooks run once, in registration order, when
    /// `init` fires; each receives the manager to call `create_client`.
    pub async fn on_init<F, Fut>(&self, hook: F)
    where
        F: FnOnce(Arc<McpClientManager>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.init_hooks
            .lock()
            .await
            .push(Box::new(move |manager| Box::pin(hook(manager))));
    }

    /// Fire the queued boot hooks exactly once. Later calls are no-ops.
    pub async fn init(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            warn!(target: "mcp_manager", "init called twice; ignoring");
            return;
        }

        let Some(me) = self.me.upgrade() else {
            return;
        };

        let hooks: Vec<InitHook> = std::mem::take(&mut *self.init_hooks.lock().await);
        info!(target: "mcp_manager", hooks = hooks.len(), "Firing bridge init hooks");

        // Bridges connect sequentially in registration order.
        for hook in hooks {
            hook(Arc::clone(&me)).await;
        }
    }

    /// Create, connect and store a bridge client.
    ///
    /// Returns None (with a log line) when the id is already taken or
    /// the connection attempt fails. A failed attempt is not stored and
    /// not remembered: the same id may be retried later.
    pub async fn create_client(
        &self,
        client_id: &str,
        server_url: &str,
        config: BridgeConfig,
    ) -> Option<Arc<McpClient>> {
        if self.clients.read().await.contains_key(client_id) {
            warn!(
                target: "mcp_manager",
                client = %client_id,
                "Client id already registered; refusing"
            );
            return None;
        }

        let client = McpClient::connect(
            client_id,
            server_url,
            config,
            self.registry.clone(),
            Arc::clone(&self.bridge_policy),
        )
        .await;

        if !client.is_connected() {
            warn!(
                target: "mcp_manager",
                client = %client_id,
                url = %server_url,
                "Connection failed; client not stored"
            );
            return None;
        }

        self.clients
            .write()
            .await
            .insert(client_id.to_string(), Arc::clone(&client));

        info!(
            target: "mcp_manager",
            client = %client_id,
            url = %server_url,
            "Bridge client stored"
        );

        Some(client)
    }

    pub async fn get_client(&self, client_id: &str) -> Option<Arc<McpClient>> {
        self.clients.read().await.get(client_id).cloned()
    }

    pub async fn get_clients(&self) -> HashMap<String, Arc<McpClient>> {
        self.clients.read().await.clone()
    }

    pub async fn has_client(&self, client_id: &str) -> bool {
        self.clients.read().await.contains_key(client_id)
    }

    /// Status of every stored client. Tool/resource/prompt counts come
    /// from fresh discovery calls at query time, so they track the
    /// remote catalog rather than what was registered at connect time.
    /// A discovery call that fails counts as zero.
    pub async fn get_client_status(&self) -> HashMap<String, ClientStatus> {
        let clients = self.get_clients().await;
        let mut status = HashMap::new();

        for (id, client) in clients {
            let tools = client.list_tools().await.map(|t| t.len()).unwrap_or(0);
            let resources = client.list_resources().await.map(|r| r.len()).unwrap_or(0);
            let prompts = client.list_prompts().await.map(|p| p.len()).unwrap_or(0);

            status.insert(
                id.clone(),
                ClientStatus {
                    id,
                    url: client.server_url().to_string(),
                    connected: client.is_connected(),
                    capabilities: client.capabilities().await,
                    tools,
                    resources,
                    prompts,
                },
            );
        }

        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{RolePolicy, Role};

    fn registry() -> AbilityRegistry {
        AbilityRegistry::new(Arc::new(RolePolicy::new(Role::Manager)))
    }

    #[tokio::test]
    async fn manager_starts_empty() {
        let manager = McpClientManager::new(registry());
        assert!(manager.get_clients().await.is_empty());
        assert!(!manager.has_client("svc").await);
    }

    #[tokio::test]
    async fn init_fires_hooks_once() {
        let manager = McpClientManager::new(registry());
        let fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&fired);
        manager
            .on_init(move |_m| async move {
                flag.store(true, Ordering::SeqCst);
            })
            .await;

        manager.init().await;
        assert!(fired.load(Ordering::SeqCst));

        // A second init must not re-fire.
        fired.store(false, Ordering::SeqCst);
        manager.init().await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
