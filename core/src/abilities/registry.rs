use super::ability::{Ability, AbilityKind, Permission};
use super::error::{AbilityError, AbilityResult};
use super::policy::AccessPolicy;
use super::response::AbilityResponse;
use dashmap::DashMap;
use opentelemetry::{
    global,
    metrics::{Counter, Histogram, UpDownCounter},
    KeyValue,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

// Per-dispatch bound; remote calls carry their own HTTP timeout below this.
const EXECUTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Directory of registered abilities
///
/// Registration is first-wins: a name, once taken, is never overwritten.
/// Execution runs the permission gate, then dispatches on the ability
/// kind under a timeout.
#[derive(Clone)]
pub struct AbilityRegistry {
    abilities: Arc<DashMap<String, Arc<Ability>>>,
    policy: Arc<dyn AccessPolicy>,

    // OpenTelemetry metrics
    invocations_counter: Counter<u64>,
    errors_counter: Counter<u64>,
    timeouts_counter: Counter<u64>,
    invoke_latency: Histogram<f64>,
    registered_gauge: UpDownCounter<i64>,
}

impl AbilityRegistry {
    pub fn new(policy: Arc<dyn AccessPolicy>) -> Self {
        let meter = global::meter("deckhand.ability_registry");

        let invocations_counter = meter
            .u64_counter("deckhand.ability_registry.invocations_total")
            .with_description("Total number of ability invocations")
            .init();

        let errors_counter = meter
            .u64_counter("deckhand.ability_registry.errors_total")
            .with_description("Total number of ability errors")
            .init();

        let timeouts_counter = meter
            .u64_counter("deckhand.ability_registry.timeouts_total")
            .with_description("Total number of ability timeouts")
            .init();

        let invoke_latency = meter
            .f64_histogram("deckhand.ability_registry.invoke_latency_ms")
            .with_description("Ability invocation latency in milliseconds")
            .init();

        let registered_gauge = meter
            .i64_up_down_counter("deckhand.ability_registry.registered_abilities")
            .with_description("Number of registered abilities")
            .init();

        Self {
            abilities: Arc::new(DashMap::new()),
            policy,
            invocations_counter,
            errors_counter,
            timeouts_counter,
            invoke_latency,
            registered_gauge,
        }
    }

    /// Register an ability. Returns false (and keeps the existing entry)
    /// when the name is already taken.
    pub fn register(&self, ability: Ability) -> bool {
        let name = ability.name.clone();
        if self.abilities.contains_key(&name) {
            warn!(target: "ability_registry", ability = %name, "Duplicate ability name refused");
            return false;
        }
        info!(target: "ability_registry", ability = %name, "Registering ability");
        self.abilities.insert(name, Arc::new(ability));
        self.registered_gauge.add(1, &[]);
        true
    }

    pub fn get(&self, name: &str) -> Option<Arc<Ability>> {
        self.abilities.get(name).map(|a| a.clone())
    }

    /// Sorted names of every registered ability.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.abilities.iter().map(|a| a.name.clone()).collect();
        names.sort();
        names
    }

    pub fn list(&self) -> Vec<Arc<Ability>> {
        self.abilities.iter().map(|a| a.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// Execute an ability by name.
    ///
    /// Native abilities resolve to the response envelope; handler errors
    /// are folded into it under the ability's error code. Remote proxies
    /// pass the bridge result (or its error value) through unmodified.
    #[tracing::instrument(skip(self, args), fields(ability.name = %name))]
    pub async fn execute(&self, name: &str, args: Value) -> AbilityResult<Value> {
        let start_time = std::time::Instant::now();

        let ability = self
            .get(name)
            .ok_or_else(|| AbilityError::NotFound(name.to_string()))?;

        self.check_permission(&ability, &args).await?;

        debug!(target: "ability_registry", ability = %name, "Invoking ability");

        let fut = self.dispatch(&ability, args);
        let result = match timeout(EXECUTE_TIMEOUT, fut).await {
            Ok(res) => res,
            Err(_) => {
                warn!(target: "ability_registry", ability = %name, "Ability execution timed out");
                self.timeouts_counter
                    .add(1, &[KeyValue::new("ability", name.to_string())]);
                Err(AbilityError::Timeout)
            }
        };

        let elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        self.invoke_latency
            .record(elapsed_ms, &[KeyValue::new("ability", name.to_string())]);

        match &result {
            Ok(_) => {
                self.invocations_counter.add(
                    1,
                    &[
                        KeyValue::new("ability", name.to_string()),
                        KeyValue::new("status", "success"),
                    ],
                );
            }
            Err(e) => {
                warn!(target: "ability_registry", ability = %name, error = %e, "Ability execution failed");
                self.errors_counter.add(
                    1,
                    &[
                        KeyValue::new("ability", name.to_string()),
                        KeyValue::new("error", e.to_string()),
                    ],
                );
            }
        }

        result
    }

    async fn check_permission(&self, ability: &Ability, args: &Value) -> AbilityResult<()> {
        let allowed = match &ability.permission {
            Permission::Open => true,
            Permission::View { resource_key } => {
                self.policy.can_view(resolve_resource(args, *resource_key).as_deref()).await
            }
            Permission::Manage { resource_key } => {
                self.policy
                    .can_manage(resolve_resource(args, *resource_key).as_deref())
                    .await
            }
            Permission::Bridge { client_id, policy } => policy(client_id),
        };

        if allowed {
            Ok(())
        } else {
            Err(AbilityError::PermissionDenied(ability.name.clone()))
        }
    }

    async fn dispatch(&self, ability: &Ability, args: Value) -> AbilityResult<Value> {
        match &ability.kind {
            AbilityKind::Native { error_code, run } => match run(args).await {
                Ok(value) => Ok(value),
                Err(e) => {
                    debug!(
                        target: "ability_registry",
                        ability = %ability.name,
                        error = %e,
                        "Native handler error folded into envelope"
                    );
                    Ok(AbilityResponse::error(error_code.clone(), e.to_string()).into_value())
                }
            },
            AbilityKind::RemoteTool { client, tool } => {
                Ok(client.call_tool(tool, args).await?)
            }
            AbilityKind::RemoteResource { client, uri } => {
                // Caller args are ignored; only the captured uri is read.
                Ok(client.read_resource(uri).await?)
            }
            AbilityKind::RemotePrompt { client, prompt } => {
                Ok(client.get_prompt(prompt, args).await?)
            }
        }
    }
}

fn resolve_resource(args: &Value, resource_key: Option<&'static str>) -> Option<String> {
    let key = resource_key?;
    args.get(key).and_then(Value::as_str).map(String::from)
}
