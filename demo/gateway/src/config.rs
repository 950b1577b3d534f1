use std::fs;
use std::path::Path;

use deckhand_core::abilities::Role;
use deckhand_core::mcp::types::AuthSpec;
use deckhand_core::mcp::BridgeConfig;

/// High-level configuration for the gateway demo
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Coarse role used for native ability permission checks.
    pub role: Role,
    /// Bridges to create at boot, in order.
    pub bridges: Vec<BridgeEntry>,
}

#[derive(Clone, Debug)]
pub struct BridgeEntry {
    pub id: String,
    pub url: String,
    pub config: BridgeConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            role: Role::Manager,
            bridges: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a TOML file (path via GATEWAY_CONFIG or
    /// ./gateway.toml), overlaying values onto defaults. A missing or
    /// unparseable file falls back to defaults with a log line.
    pub fn load() -> Self {
        let default = Self::default();
        let path = std::env::var("GATEWAY_CONFIG").unwrap_or_else(|_| "gateway.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::info!(target: "gateway", path = %path, "No TOML config found; using defaults");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match toml::from_str::<GatewayToml>(&s) {
                Ok(t) => t.overlay(default),
                Err(e) => {
                    tracing::warn!(target: "gateway", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "gateway", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct GatewayToml {
    pub role: Option<Role>,
    pub bridges: Option<Vec<BridgeToml>>,
}

impl GatewayToml {
    fn overlay(self, mut base: GatewayConfig) -> GatewayConfig {
        if let Some(role) = self.role {
            base.role = role;
        }
        if let Some(bridges) = self.bridges {
            base.bridges = bridges.into_iter().map(BridgeToml::into_entry).collect();
        }
        base
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
struct BridgeToml {
    pub id: String,
    pub url: String,
    pub timeout_secs: Option<u64>,
    pub auth: Option<AuthSpec>,
}

impl BridgeToml {
    fn into_entry(self) -> BridgeEntry {
        let mut config = BridgeConfig::default();
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        config.auth = self.auth;
        BridgeEntry {
            id: self.id,
            url: self.url,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_entries_parse_with_auth() {
        let toml_content = r#"
            role = "member"

            [[bridges]]
            id = "issues"
            url = "https://issues.example.com/mcp"
            timeout_secs = 10

            [bridges.auth]
            type = "bearer"
            token = "T"

            [[bridges]]
            id = "wiki"
            url = "https://wiki.example.com/mcp"
        "#;

        let parsed: GatewayToml = toml::from_str(toml_content).unwrap();
        let config = parsed.overlay(GatewayConfig::default());

        assert_eq!(config.role, Role::Member);
        assert_eq!(config.bridges.len(), 2);
        assert_eq!(config.bridges[0].id, "issues");
        assert_eq!(config.bridges[0].config.timeout_secs, 10);
        assert!(matches!(
            config.bridges[0].config.auth,
            Some(AuthSpec::Bearer { ref token }) if token == "T"
        ));
        assert_eq!(config.bridges[1].config.timeout_secs, 30);
        assert!(config.bridges[1].config.auth.is_none());
    }
}
