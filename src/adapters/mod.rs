//! Chain adapters.
//!
//! # Data Flow
//! ```text
//! CoinClient call
//!     → bitcoin.rs  (UtxoClient → shared BitcoinRpc) ─┐
//!     → ripple.rs   (RippleClient)                    ├─► rpc.rs (JSON-RPC over reqwest)
//!     → evm.rs      (EvmClient → alloy provider)      ─┘   or alloy's own transport
//!     → erc20.rs    (Erc20Client → shared EvmClient)
//!     → canonical types (transport::types)
//! ```
//!
//! # Design Decisions
//! - Each adapter bounds its calls with its own transport timeout
//! - Protocol shapes never leave this module
//! - Forks of a protocol are the same adapter with a different asset id, and
//!   tokens wrap the client of the chain they live on

pub mod bitcoin;
pub mod erc20;
pub mod evm;
pub mod ripple;
pub mod rpc;

pub use bitcoin::{BitcoinRpc, UtxoClient};
pub use erc20::Erc20Client;
pub use evm::EvmClient;
pub use ripple::RippleClient;
pub use rpc::{JsonRpcClient, RpcError};
