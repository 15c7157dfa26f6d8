//! Multi-chain coins oracle.
//!
//! One uniform query surface (chain state, balances, transactions, address
//! import) over heterogeneous blockchain nodes, keyed by asset id.

pub mod adapters;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod resilience;
pub mod transport;

pub use config::OracleConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::CoinRegistry;
pub use transport::{CoinClient, NodeError, NodeResult};
