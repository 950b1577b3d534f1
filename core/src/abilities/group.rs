/// Ability group contract
///
/// A group is a cohesive set of related abilities sharing a guard and
/// permission scheme. Construction is cheap; `register` is only called
/// when `enabled()` passes, so a group wrapping an absent backend
/// contributes nothing and never errors.
use super::error::{AbilityError, AbilityResult};
use super::registry::AbilityRegistry;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub trait AbilityGroup: Send + Sync {
    /// Namespace prefix of the group's ability names (e.g. "boards").
    fn slug(&self) -> &'static str;

    /// Guard: whether the wrapped backend is present and usable.
    fn enabled(&self) -> bool {
        true
    }

    /// Register every ability of the group. Returns the count registered.
    fn register(&self, registry: &AbilityRegistry) -> usize;
}

/// Register each enabled group, skipping disabled ones with a log line.
pub fn register_groups(registry: &AbilityRegistry, groups: &[Arc<dyn AbilityGroup>]) -> usize {
    let mut total = 0;
    for group in groups {
        if !group.enabled() {
            info!(target: "ability_registry", group = %group.slug(), "Group disabled; skipping");
            continue;
        }
        let count = group.register(registry);
        info!(target: "ability_registry", group = %group.slug(), count, "Registered ability group");
        total += count;
    }
    total
}

// Argument extraction helpers shared by the native groups.

pub fn require_str<'a>(args: &'a Value, key: &str) -> AbilityResult<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AbilityError::InvalidArguments(format!("Missing '{}'", key)))
}

pub fn require_uuid(args: &Value, key: &str) -> AbilityResult<Uuid> {
    let raw = require_str(args, key)?;
    Uuid::parse_str(raw)
        .map_err(|_| AbilityError::InvalidArguments(format!("'{}' is not a valid id", key)))
}

pub fn opt_str(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(String::from)
}

pub fn opt_uuid(args: &Value, key: &str) -> AbilityResult<Option<Uuid>> {
    match args.get(key).and_then(Value::as_str) {
        None => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| AbilityError::InvalidArguments(format!("'{}' is not a valid id", key))),
    }
}

pub fn opt_u32(args: &Value, key: &str) -> Option<u32> {
    args.get(key).and_then(Value::as_u64).map(|v| v as u32)
}

pub fn opt_bool(args: &Value, key: &str) -> Option<bool> {
    args.get(key).and_then(Value::as_bool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_str_rejects_blank_and_missing() {
        let args = json!({"title": "  ", "name": "ok"});
        assert!(require_str(&args, "title").is_err());
        assert!(require_str(&args, "absent").is_err());
        assert_eq!(require_str(&args, "name").unwrap(), "ok");
    }

    #[test]
    fn require_uuid_validates_format() {
        let id = Uuid::new_v4();
        let args = json!({"board_id": id.to_string(), "bad": "nope"});
        assert_eq!(require_uuid(&args, "board_id").unwrap(), id);
        assert!(require_uuid(&args, "bad").is_err());
    }
}
