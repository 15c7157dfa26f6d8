//! Aggregated node listing.
//!
//! # Responsibilities
//! - Produce one [`RegisteredNode`] per registered adapter
//! - Optionally enrich each entry with live chain state, in parallel
//!
//! # Design Decisions
//! - Output slots are assigned from the snapshot before any task starts;
//!   each task's result lands only in its own slot
//! - Latency is bounded by the slowest adapter, not the sum
//! - No timeout at this layer: an adapter without its own transport timeout
//!   can stall the whole listing

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::registry::resolver::CoinRegistry;
use crate::transport::ChainState;

/// One entry of the node listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredNode {
    #[serde(rename = "assetId")]
    pub asset_id: String,

    /// Always true: presence in the registry is the only liveness signal.
    pub running: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ChainState>,
}

impl CoinRegistry {
    /// List every registered adapter, fetching chain state when `enrich`.
    ///
    /// A failed `get_info` is logged and leaves that entry's `info` unset;
    /// it never fails the listing.
    pub async fn get_nodes(&self, enrich: bool) -> Vec<RegisteredNode> {
        let entries = self.entries();

        let mut nodes: Vec<RegisteredNode> = entries
            .iter()
            .map(|(asset_id, _)| RegisteredNode {
                asset_id: asset_id.clone(),
                running: true,
                info: None,
            })
            .collect();

        if !enrich || entries.is_empty() {
            return nodes;
        }

        tracing::debug!(count = entries.len(), "Fetching info for registered nodes");

        let handles: Vec<_> = entries
            .into_iter()
            .map(|(asset_id, client)| {
                tokio::spawn(async move {
                    let result = client.get_info().await;
                    (asset_id, result)
                })
            })
            .collect();

        // join_all preserves order, so result i belongs to slot i.
        for (slot, joined) in nodes.iter_mut().zip(join_all(handles).await) {
            match joined {
                Ok((asset_id, Ok(state))) => {
                    tracing::debug!(
                        asset_id = %asset_id,
                        block_height = state.block_height,
                        "Node info received"
                    );
                    metrics::record_node_info(&asset_id, true);
                    slot.info = Some(state);
                }
                Ok((asset_id, Err(e))) => {
                    tracing::warn!(asset_id = %asset_id, error = %e, "Node info request failed");
                    metrics::record_node_info(&asset_id, false);
                }
                Err(e) => {
                    tracing::error!(asset_id = %slot.asset_id, error = %e, "Node info task aborted");
                    metrics::record_node_info(&slot.asset_id, false);
                }
            }
        }

        tracing::debug!("Finished fetching node info");
        nodes
    }
}
