//! Canonical client contract shared by every chain adapter.
//!
//! # Data Flow
//! ```text
//! Front end resolves asset id
//!     → registry (CoinRegistry::get)
//!     → client.rs (CoinClient / AddressImporter)
//!     → adapter speaks its own upstream protocol
//!     → types.rs (ChainState, Balance, Transaction)
//!     → confirmation.rs (normalized finality)
//! ```
//!
//! # Design Decisions
//! - Callers never see protocol-specific shapes, only the types in types.rs
//! - Import is an optional capability discovered at runtime, not a trait bound
//! - Errors carry asset/operation context and are never retried here

pub mod client;
pub mod confirmation;
pub mod error;
pub mod types;

pub use client::{import_address, AddressImporter, CoinClient};
pub use confirmation::DEFAULT_CONFIRMATION_THRESHOLD;
pub use error::{BoxError, NodeError, NodeResult};
pub use types::{AssetBalance, Balance, ChainState, ConfirmationInfo, Transaction};
