//! bitcoind-compatible adapter (BTC and forks such as LTC, BCH, DOGE).
//!
//! # Data Flow
//! ```text
//! UtxoClient (asset id) ──► BitcoinRpc (shared per endpoint) ──► bitcoind
//!
//! get_info          → getblockchaininfo
//! get_balance       → listunspent 1 9999999 [addr], amounts summed
//! get_transaction   → getrawtransaction txid 1, plus the funding tx of vin[0]
//! import_address    → importaddress addr "" true   (slow, may rescan)
//! ```
//!
//! # Design Decisions
//! - Forks reuse the same client with a different asset id
//! - Import is raced against a client-side limit and tried twice; the wallet
//!   "busy rescanning" error counts as already in progress
//! - Import goes through its own HTTP client without a request deadline, so
//!   the import limit is the only one and an abandoned rescan keeps running
//! - Amounts are reported with six decimals

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::rpc::{JsonRpcClient, RpcError};
use crate::resilience::{converge, OperationState, SlowOperation, CONVERGE_ATTEMPTS};
use crate::transport::{
    AddressImporter, Balance, ChainState, CoinClient, ConfirmationInfo, NodeError, NodeResult,
    Transaction,
};

/// bitcoind's RPC_WALLET_ERROR, returned while a rescan is running.
pub const RPC_WALLET_ERROR: i64 = -4;

const MIN_CONFIRMATIONS: u64 = 1;
const MAX_CONFIRMATIONS: u64 = 9_999_999;

#[derive(Debug, Clone, Deserialize)]
pub struct BlockchainInfo {
    pub chain: String,
    pub blocks: u64,
    #[serde(rename = "bestblockhash")]
    pub best_block_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Unspent {
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub txid: String,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub vin: Vec<TxInput>,
    #[serde(default)]
    pub vout: Vec<TxOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxInput {
    /// Funding transaction; absent on coinbase inputs.
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub vout: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxOutput {
    pub value: f64,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub address: Option<String>,
    /// Pre-22.0 nodes report a list instead of `address`.
    #[serde(default)]
    pub addresses: Option<Vec<String>>,
}

impl ScriptPubKey {
    pub fn address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .or_else(|| self.addresses.as_ref().and_then(|a| a.first()).map(String::as_str))
    }
}

/// Protocol client for one bitcoind endpoint.
#[derive(Debug)]
pub struct BitcoinRpc {
    rpc: JsonRpcClient,
    /// No transport timeout; only `importaddress` uses it.
    import_rpc: JsonRpcClient,
}

impl BitcoinRpc {
    pub fn new(
        endpoint: &str,
        user: Option<String>,
        pass: Option<String>,
        timeout: Duration,
    ) -> NodeResult<Self> {
        let rpc = JsonRpcClient::new(endpoint, timeout)
            .map_err(|e| NodeError::InvalidInput(e.to_string()))?;
        let import_rpc = JsonRpcClient::unbounded(endpoint)
            .map_err(|e| NodeError::InvalidInput(e.to_string()))?;
        let (rpc, import_rpc) = match user {
            Some(user) => (
                rpc.with_basic_auth(user.clone(), pass.clone()),
                import_rpc.with_basic_auth(user, pass),
            ),
            None => (rpc, import_rpc),
        };
        Ok(Self { rpc, import_rpc })
    }

    pub async fn blockchain_info(&self) -> Result<BlockchainInfo, RpcError> {
        self.rpc.call("getblockchaininfo", json!([])).await
    }

    pub async fn list_unspent(&self, address: &str) -> Result<Vec<Unspent>, RpcError> {
        self.rpc
            .call("listunspent", json!([MIN_CONFIRMATIONS, MAX_CONFIRMATIONS, [address]]))
            .await
    }

    pub async fn raw_transaction(&self, txid: &str) -> Result<RawTransaction, RpcError> {
        self.rpc.call("getrawtransaction", json!([txid, 1])).await
    }

    /// Watch-only import with rescan. Blocks until the rescan finishes; the
    /// caller bounds the wait.
    pub async fn import_address(&self, address: &str) -> Result<(), RpcError> {
        self.import_rpc
            .call::<serde_json::Value>("importaddress", json!([address, "", true]))
            .await
            .map(|_| ())
    }
}

/// [`CoinClient`] for a bitcoind-family asset.
pub struct UtxoClient {
    asset_id: String,
    rpc: Arc<BitcoinRpc>,
    import: SlowOperation,
}

impl UtxoClient {
    pub fn new(asset_id: String, rpc: Arc<BitcoinRpc>, import: SlowOperation) -> Self {
        Self {
            asset_id,
            rpc,
            import,
        }
    }

    fn upstream(&self, operation: &'static str, e: RpcError) -> NodeError {
        NodeError::upstream(&self.asset_id, operation, e)
    }

    /// One bounded import attempt.
    async fn import_once(&self, address: &str) -> NodeResult<OperationState> {
        let rpc = Arc::clone(&self.rpc);
        let asset_id = self.asset_id.clone();
        let address = address.to_string();

        self.import
            .run(&self.asset_id, async move {
                match rpc.import_address(&address).await {
                    Ok(()) => Ok(OperationState::Completed),
                    Err(RpcError::Rpc { code, message }) if code == RPC_WALLET_ERROR => {
                        tracing::debug!(asset_id = %asset_id, message = %message, "Import already running");
                        Ok(OperationState::AlreadyInProgress)
                    }
                    Err(e) => Err(NodeError::upstream(asset_id, "import_address", e)),
                }
            })
            .await
    }

    /// Address credited by output `index` of transaction `txid`.
    async fn funding_address(&self, txid: &str, index: usize) -> NodeResult<String> {
        let funding = self
            .rpc
            .raw_transaction(txid)
            .await
            .map_err(|e| self.upstream("get_transaction_by_hash", e))?;

        funding
            .vout
            .get(index)
            .and_then(|out| out.script_pub_key.address())
            .map(str::to_string)
            .ok_or_else(|| {
                NodeError::upstream(
                    &self.asset_id,
                    "get_transaction_by_hash",
                    format!("funding output {txid}:{index} has no address"),
                )
            })
    }
}

#[async_trait]
impl CoinClient for UtxoClient {
    fn asset_id(&self) -> &str {
        &self.asset_id
    }

    async fn get_info(&self) -> NodeResult<ChainState> {
        let info = self
            .rpc
            .blockchain_info()
            .await
            .map_err(|e| self.upstream("get_info", e))?;

        Ok(ChainState {
            chain_name: info.chain,
            block_height: info.blocks,
            current_block_hash: info.best_block_hash,
        })
    }

    async fn get_balance(&self, address: &str) -> NodeResult<Balance> {
        let unspent = self
            .rpc
            .list_unspent(address)
            .await
            .map_err(|e| self.upstream("get_balance", e))?;

        let total: f64 = unspent.iter().map(|u| u.amount).sum();
        Ok(Balance::single(&self.asset_id, format_amount(total)))
    }

    async fn get_transaction_by_hash(&self, id: &str) -> NodeResult<Transaction> {
        let raw = self
            .rpc
            .raw_transaction(id)
            .await
            .map_err(|e| self.upstream("get_transaction_by_hash", e))?;

        let first = raw.vin.first().ok_or_else(|| {
            NodeError::upstream(&self.asset_id, "get_transaction_by_hash", "transaction has no inputs")
        })?;

        // Coinbase inputs have no funding transaction.
        let from = match (&first.txid, first.vout) {
            (Some(txid), Some(index)) => self.funding_address(txid, index).await?,
            _ => String::new(),
        };

        let to = raw
            .vout
            .iter()
            .find_map(|out| out.script_pub_key.address())
            .unwrap_or_default()
            .to_string();

        let value: f64 = raw.vout.iter().map(|out| out.value).sum();
        let observed = raw.confirmations.unwrap_or(0);

        Ok(Transaction {
            id: raw.txid,
            from,
            to,
            value: format_amount(value),
            confirmation: ConfirmationInfo::with_default_threshold(observed),
        })
    }

    fn as_importer(&self) -> Option<&dyn AddressImporter> {
        Some(self)
    }
}

#[async_trait]
impl AddressImporter for UtxoClient {
    async fn import_address(&self, address: &str) -> NodeResult<()> {
        let state = converge(CONVERGE_ATTEMPTS, || self.import_once(address)).await?;
        tracing::info!(asset_id = %self.asset_id, address = %address, state = ?state, "Address import accepted");
        Ok(())
    }
}

/// Six-decimal rendering used for every bitcoin-family amount.
pub fn format_amount(amount: f64) -> String {
    format!("{:.6}", amount)
}
