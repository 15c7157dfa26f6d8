//! Canonical data model returned by every adapter.
//!
//! Field names are the wire contract of the HTTP front end, so the serde
//! renames here must stay stable.

use serde::{Deserialize, Serialize};

/// Snapshot of a backend's sync position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    /// Network the node is following (e.g. "main", "test", a chain id).
    #[serde(rename = "chain")]
    pub chain_name: String,

    /// Height of the current chain head.
    pub block_height: u64,

    /// Hash of the current chain head.
    pub current_block_hash: String,
}

/// Balance of one asset held by an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    #[serde(rename = "asset")]
    pub asset_symbol: String,

    /// Decimal amount rendered as a string to avoid float drift.
    pub balance: String,
}

/// Balances held by an address.
///
/// Some ledgers hold several sub-assets per account, so this is an ordered
/// list rather than a single value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub assets: Vec<AssetBalance>,
}

impl Balance {
    /// Balance holding exactly one asset.
    pub fn single(asset_symbol: impl Into<String>, balance: impl Into<String>) -> Self {
        Self {
            assets: vec![AssetBalance {
                asset_symbol: asset_symbol.into(),
                balance: balance.into(),
            }],
        }
    }
}

/// Normalized finality of a transaction.
///
/// `threshold` and `observed_confirmations` are either both meaningful or
/// both absent. Absent means the ledger has no notion of confirmation depth;
/// it is not the same as zero confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u64>,

    pub confirmed: bool,

    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub observed_confirmations: Option<u64>,
}

/// A transaction in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub from: String,
    pub to: String,
    pub value: String,
    #[serde(rename = "confirmations")]
    pub confirmation: ConfirmationInfo,
}
