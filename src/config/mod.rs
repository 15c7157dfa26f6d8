//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → OracleConfig (validated, immutable)
//!     → registry bootstrap builds one adapter per node entry
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the registry is never rebuilt
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Node endpoints may be overridden per node from the environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{normalize_endpoint, NodeConfig, NodeKind, OracleConfig};
pub use schema::{ListenerConfig, ObservabilityConfig, TimeoutConfig};
