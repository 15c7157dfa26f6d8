//! Confirmation model.
//!
//! # Rules
//! ```text
//! Depth-based ledgers (UTXO, account chains):
//!     confirmed = observed >= threshold      (threshold defaults to 5)
//!
//! Finalized ledgers (federated consensus, DAG):
//!     confirmed = record is retrievable      (threshold/observed omitted)
//! ```
//!
//! Observed depth is either read from a node-provided counter or computed as
//! `head_height - tx_height`.

use crate::transport::types::ConfirmationInfo;

/// Depth after which a transaction is treated as final.
pub const DEFAULT_CONFIRMATION_THRESHOLD: u64 = 5;

impl ConfirmationInfo {
    /// Confirmation for a ledger that measures depth.
    pub fn from_depth(observed: u64, threshold: u64) -> Self {
        Self {
            threshold: Some(threshold),
            confirmed: observed >= threshold,
            observed_confirmations: Some(observed),
        }
    }

    /// Confirmation against [`DEFAULT_CONFIRMATION_THRESHOLD`].
    pub fn with_default_threshold(observed: u64) -> Self {
        Self::from_depth(observed, DEFAULT_CONFIRMATION_THRESHOLD)
    }

    /// Confirmation for a ledger without depth, where `confirmed` is the
    /// adapter's own finality signal.
    pub fn finality(confirmed: bool) -> Self {
        Self {
            threshold: None,
            confirmed,
            observed_confirmations: None,
        }
    }

    /// Retrievable record on a ledger that only stores final results.
    pub fn finalized() -> Self {
        Self::finality(true)
    }
}

/// Depth of a transaction included at `tx_height` given the current head.
///
/// A pending transaction (no height yet) has zero confirmations. A head that
/// lags the transaction height (inconsistent backend) also yields zero.
pub fn confirmations_between(head_height: u64, tx_height: Option<u64>) -> u64 {
    match tx_height {
        Some(height) => head_height.saturating_sub(height),
        None => 0,
    }
}
