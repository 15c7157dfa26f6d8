//! Client registry and aggregation engine.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     bootstrap.rs (ordered (asset id, constructor) list)
//!     → resolver.rs (CoinRegistry::register, last write wins)
//!
//! Per request:
//!     resolver.rs (case-insensitive get) → adapter call
//!
//! Listing:
//!     nodes.rs (snapshot entries → fan out get_info → gather into slots)
//! ```
//!
//! # Design Decisions
//! - One mutex guards the map, held only for in-memory access, never across I/O
//! - No removal: adapters live for the process lifetime
//! - A failing adapter never fails the listing; its `info` is left unset

pub mod bootstrap;
pub mod nodes;
pub mod resolver;

pub use bootstrap::{initialize, Constructor};
pub use nodes::RegisteredNode;
pub use resolver::{CoinRegistry, SharedClient};
