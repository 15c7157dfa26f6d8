//! Ethereum-compatible adapter built on alloy.
//!
//! # Data Flow
//! ```text
//! get_info          → eth_chainId + eth_getBlockByNumber(latest)
//! get_balance       → eth_getBalance (wei)
//! get_transaction   → eth_getTransactionByHash + eth_blockNumber
//! ```
//!
//! # Design Decisions
//! - Chain name is the numeric chain id
//! - Depth is `head - tx block`; a pending transaction has zero
//! - Every provider call is bounded by the adapter timeout
//! - ERC-20 tokens (erc20.rs) reuse one client per chain endpoint

use alloy::consensus::Transaction as _;
use alloy::eips::BlockNumberOrTag;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Transaction as RpcTransaction, TransactionRequest};
use async_trait::async_trait;
use std::future::IntoFuture;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::transport::confirmation::confirmations_between;
use crate::transport::{
    BoxError, Balance, ChainState, CoinClient, ConfirmationInfo, NodeError, NodeResult, Transaction,
};

/// [`CoinClient`] for an EVM JSON-RPC endpoint.
///
/// Token clients on the same chain hold an `Arc` of this and go through the
/// `*_for` helpers, which attribute failures to the caller's asset id.
pub struct EvmClient {
    asset_id: String,
    provider: Arc<dyn Provider + Send + Sync>,
    timeout_duration: Duration,
}

impl EvmClient {
    pub fn new(asset_id: String, endpoint: &str, timeout_duration: Duration) -> NodeResult<Self> {
        let url: url::Url = endpoint
            .parse()
            .map_err(|e| NodeError::InvalidInput(format!("invalid RPC URL '{}': {}", endpoint, e)))?;
        let provider = Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        Ok(Self {
            asset_id,
            provider,
            timeout_duration,
        })
    }

    /// Await a provider call within the adapter timeout.
    async fn bounded<F, T, E>(&self, asset_id: &str, operation: &'static str, call: F) -> NodeResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        match timeout(self.timeout_duration, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(NodeError::upstream(asset_id, operation, e)),
            Err(_) => Err(NodeError::upstream(
                asset_id,
                operation,
                format!("rpc timed out after {}ms", self.timeout_duration.as_millis()),
            )),
        }
    }

    pub(crate) async fn chain_state_for(&self, asset_id: &str) -> NodeResult<ChainState> {
        let chain_id = self.bounded(asset_id, "get_info", self.provider.get_chain_id()).await?;
        let block = self
            .bounded(
                asset_id,
                "get_info",
                self.provider.get_block_by_number(BlockNumberOrTag::Latest),
            )
            .await?
            .ok_or_else(|| NodeError::upstream(asset_id, "get_info", "latest block unavailable"))?;

        Ok(ChainState {
            chain_name: chain_id.to_string(),
            block_height: block.header.inner.number,
            current_block_hash: block.header.hash.to_string(),
        })
    }

    /// Transaction `id` and its depth below the current head.
    pub(crate) async fn transaction_for(&self, asset_id: &str, id: &str) -> NodeResult<MinedTransaction> {
        let hash = TxHash::from_str(id)
            .map_err(|e| NodeError::InvalidInput(format!("invalid transaction hash '{}': {}", id, e)))?;

        let tx = self
            .bounded(
                asset_id,
                "get_transaction_by_hash",
                self.provider.get_transaction_by_hash(hash),
            )
            .await?
            .ok_or_else(|| {
                NodeError::upstream(asset_id, "get_transaction_by_hash", format!("transaction {id} not found"))
            })?;
        let head = self
            .bounded(asset_id, "get_transaction_by_hash", self.provider.get_block_number())
            .await?;

        Ok(MinedTransaction {
            hash,
            observed: confirmations_between(head, tx.block_number),
            tx,
        })
    }

    /// Read-only `eth_call` against `contract` at the latest block.
    pub(crate) async fn call_for(
        &self,
        asset_id: &str,
        operation: &'static str,
        contract: Address,
        input: impl Into<Bytes>,
    ) -> NodeResult<Bytes> {
        let request = TransactionRequest::default()
            .with_to(contract)
            .with_input(input.into());
        self.bounded(asset_id, operation, self.provider.call(request)).await
    }
}

/// A looked-up transaction with its observed confirmations.
pub(crate) struct MinedTransaction {
    pub hash: TxHash,
    pub tx: RpcTransaction,
    pub observed: u64,
}

/// Parse a caller-supplied account address.
pub(crate) fn parse_address(address: &str) -> NodeResult<Address> {
    Address::from_str(address)
        .map_err(|e| NodeError::InvalidInput(format!("invalid address '{}': {}", address, e)))
}

#[async_trait]
impl CoinClient for EvmClient {
    fn asset_id(&self) -> &str {
        &self.asset_id
    }

    async fn get_info(&self) -> NodeResult<ChainState> {
        self.chain_state_for(&self.asset_id).await
    }

    async fn get_balance(&self, address: &str) -> NodeResult<Balance> {
        let address = parse_address(address)?;
        let wei = self
            .bounded(&self.asset_id, "get_balance", self.provider.get_balance(address))
            .await?;

        Ok(Balance::single(&self.asset_id, wei.to_string()))
    }

    async fn get_transaction_by_hash(&self, id: &str) -> NodeResult<Transaction> {
        let MinedTransaction { hash, tx, observed } = self.transaction_for(&self.asset_id, id).await?;

        Ok(Transaction {
            id: hash.to_string(),
            from: tx.inner.signer().to_string(),
            to: tx.to().map(|to| to.to_string()).unwrap_or_default(),
            value: tx.value().to_string(),
            confirmation: ConfirmationInfo::with_default_threshold(observed),
        })
    }
}
