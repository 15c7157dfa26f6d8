//! Client contract implemented by every chain adapter.
//!
//! # Responsibilities
//! - Define the mandatory capability set (info, balance, transaction)
//! - Expose import as an optional capability checked before invocation
//!
//! # Design Decisions
//! - Adapters are shared as `Arc<dyn CoinClient>`; they must be `Send + Sync`
//!   because the aggregation engine calls them concurrently with handlers
//! - Each adapter bounds its own latency through its transport timeout

use async_trait::async_trait;

use crate::transport::error::{NodeError, NodeResult};
use crate::transport::types::{Balance, ChainState, Transaction};

/// Uniform query surface over one blockchain backend.
#[async_trait]
pub trait CoinClient: Send + Sync {
    /// Asset identifier this adapter serves.
    fn asset_id(&self) -> &str;

    /// Current chain head / sync state.
    async fn get_info(&self) -> NodeResult<ChainState>;

    /// Balances held by `address`.
    async fn get_balance(&self, address: &str) -> NodeResult<Balance>;

    /// Transaction identified by `id`.
    async fn get_transaction_by_hash(&self, id: &str) -> NodeResult<Transaction>;

    /// Import capability, if the backend supports tracking addresses.
    fn as_importer(&self) -> Option<&dyn AddressImporter> {
        None
    }
}

/// Optional capability: start tracking an address on the backend.
///
/// Importing may trigger a rescan that takes hours; implementations are
/// expected to route the call through the slow-operation wrapper.
#[async_trait]
pub trait AddressImporter: Send + Sync {
    async fn import_address(&self, address: &str) -> NodeResult<()>;
}

/// Import `address` through `client`, failing when the capability is absent.
pub async fn import_address(client: &dyn CoinClient, address: &str) -> NodeResult<()> {
    match client.as_importer() {
        Some(importer) => importer.import_address(address).await,
        None => Err(NodeError::CapabilityUnsupported {
            asset_id: client.asset_id().to_string(),
            capability: "import_address",
        }),
    }
}
