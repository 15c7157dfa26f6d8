//! rippled adapter.
//!
//! # Data Flow
//! ```text
//! get_info          → server_info    (validated ledger, else closed ledger)
//! get_balance       → account_info   (drops → XRP)
//! get_transaction   → tx             (confirmed = validated)
//! ```
//!
//! # Design Decisions
//! - The ledger has no depth concept: transactions carry the ledger's
//!   finality flag and no threshold
//! - rippled reports failures inside `result` with `status: "error"`, so
//!   results are checked before decoding
//! - No import capability

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::adapters::rpc::JsonRpcClient;
use crate::transport::{
    Balance, ChainState, CoinClient, ConfirmationInfo, NodeError, NodeResult, Transaction,
};

const DROPS_PER_XRP: u64 = 1_000_000;

#[derive(Debug, Deserialize)]
struct ServerInfoResult {
    info: ServerInfo,
}

#[derive(Debug, Deserialize)]
struct ServerInfo {
    #[serde(default)]
    validated_ledger: Option<LedgerRef>,
    #[serde(default)]
    closed_ledger: Option<LedgerRef>,
}

#[derive(Debug, Clone, Deserialize)]
struct LedgerRef {
    hash: String,
    seq: u64,
}

#[derive(Debug, Deserialize)]
struct AccountInfoResult {
    account_data: AccountData,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    #[serde(rename = "Balance")]
    balance: String,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    hash: String,
    #[serde(rename = "Account")]
    account: String,
    #[serde(rename = "Destination", default)]
    destination: Option<String>,
    #[serde(rename = "Amount", default)]
    amount: Option<Amount>,
    #[serde(default)]
    validated: bool,
}

/// XRP in drops, or an issued-currency amount.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Drops(String),
    Issued {
        currency: String,
        #[serde(default)]
        issuer: Option<String>,
        value: String,
    },
}

/// [`CoinClient`] backed by a rippled JSON-RPC endpoint.
pub struct RippleClient {
    asset_id: String,
    chain: String,
    rpc: JsonRpcClient,
}

impl RippleClient {
    pub fn new(asset_id: String, endpoint: &str, chain: String, timeout: Duration) -> NodeResult<Self> {
        let rpc = JsonRpcClient::new(endpoint, timeout)
            .map_err(|e| NodeError::InvalidInput(e.to_string()))?;
        Ok(Self {
            asset_id,
            chain,
            rpc,
        })
    }

    /// Issue `method` and decode `result`, surfacing rippled's in-band errors.
    async fn request<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: &str,
        params: Value,
    ) -> NodeResult<T> {
        let result: Value = self
            .rpc
            .call(method, json!([params]))
            .await
            .map_err(|e| NodeError::upstream(&self.asset_id, operation, e))?;

        if result.get("status").and_then(Value::as_str) == Some("error") {
            let code = result.get("error").and_then(Value::as_str).unwrap_or("unknown");
            let message = result
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or(code);
            return Err(NodeError::upstream(
                &self.asset_id,
                operation,
                format!("{code}: {message}"),
            ));
        }

        serde_json::from_value(result).map_err(|e| NodeError::upstream(&self.asset_id, operation, e))
    }
}

#[async_trait]
impl CoinClient for RippleClient {
    fn asset_id(&self) -> &str {
        &self.asset_id
    }

    async fn get_info(&self) -> NodeResult<ChainState> {
        let result: ServerInfoResult = self.request("get_info", "server_info", json!({})).await?;

        let ledger = result
            .info
            .validated_ledger
            .or(result.info.closed_ledger)
            .ok_or_else(|| NodeError::upstream(&self.asset_id, "get_info", "no ledger reported"))?;

        Ok(ChainState {
            chain_name: self.chain.clone(),
            block_height: ledger.seq,
            current_block_hash: ledger.hash,
        })
    }

    async fn get_balance(&self, address: &str) -> NodeResult<Balance> {
        let result: AccountInfoResult = self
            .request(
                "get_balance",
                "account_info",
                json!({"account": address, "ledger_index": "validated"}),
            )
            .await?;

        let drops: u64 = result.account_data.balance.parse().map_err(|_| {
            NodeError::upstream(
                &self.asset_id,
                "get_balance",
                format!("malformed balance '{}'", result.account_data.balance),
            )
        })?;

        Ok(Balance::single(&self.asset_id, format_drops(drops)))
    }

    async fn get_transaction_by_hash(&self, id: &str) -> NodeResult<Transaction> {
        let tx: TxResult = self
            .request("get_transaction_by_hash", "tx", json!({"transaction": id}))
            .await?;

        let value = match tx.amount {
            Some(Amount::Drops(drops)) => drops
                .parse::<u64>()
                .map(format_drops)
                .map_err(|_| {
                    NodeError::upstream(
                        &self.asset_id,
                        "get_transaction_by_hash",
                        format!("malformed amount '{drops}'"),
                    )
                })?,
            Some(Amount::Issued { value, .. }) => value,
            None => "0".to_string(),
        };

        Ok(Transaction {
            id: tx.hash,
            from: tx.account,
            to: tx.destination.unwrap_or_default(),
            value,
            confirmation: ConfirmationInfo::finality(tx.validated),
        })
    }
}

/// Render drops as XRP without trailing zeros.
pub fn format_drops(drops: u64) -> String {
    let whole = drops / DROPS_PER_XRP;
    let frac = drops % DROPS_PER_XRP;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:06}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
