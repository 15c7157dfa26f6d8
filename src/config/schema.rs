//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the oracle.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the oracle.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OracleConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Blockchain nodes to register, in registration order.
    pub nodes: Vec<NodeConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Front-end request timeout in seconds.
    pub request_secs: u64,

    /// Default transport timeout for adapter RPC calls in seconds.
    pub rpc_secs: u64,

    /// Client-side wait for address imports in seconds.
    pub import_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            rpc_secs: 3,
            import_secs: 3,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Upstream protocol spoken by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// bitcoind-compatible JSON-RPC (BTC and its forks).
    Bitcoin,
    /// rippled JSON-RPC.
    Ripple,
    /// Ethereum-compatible JSON-RPC.
    Evm,
    /// ERC-20 token on an Ethereum-compatible chain.
    Erc20,
}

/// One blockchain node to register.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    /// Asset identifier used as registry key (e.g., "BTC").
    pub asset_id: String,

    /// Protocol family.
    pub kind: NodeKind,

    /// Node endpoint; `http://` is assumed when no scheme is given.
    #[serde(default)]
    pub url: Option<String>,

    /// Environment variable that overrides `url` when set.
    #[serde(default)]
    pub url_env: Option<String>,

    /// RPC basic-auth user (bitcoin only).
    #[serde(default)]
    pub rpc_user: Option<String>,

    /// RPC basic-auth password (bitcoin only).
    #[serde(default)]
    pub rpc_pass: Option<String>,

    /// Chain label for ledgers that do not report one.
    #[serde(default)]
    pub chain: Option<String>,

    /// Token contract address (erc20 only).
    #[serde(default)]
    pub contract: Option<String>,
}

impl NodeConfig {
    /// Endpoint after applying the environment override and scheme default.
    pub fn resolved_url(&self) -> String {
        let from_env = self
            .url_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|v| !v.trim().is_empty());

        normalize_endpoint(from_env.as_deref().or(self.url.as_deref()))
    }
}

/// Default endpoint when a node has none configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost";

/// Apply the endpoint defaults: empty → localhost, missing scheme → `http://`.
pub fn normalize_endpoint(raw: Option<&str>) -> String {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return DEFAULT_ENDPOINT.to_string();
    }

    if value.starts_with("http://") || value.starts_with("https://") {
        value.to_string()
    } else {
        format!("http://{value}")
    }
}
