//! Error taxonomy for registry lookups and adapter calls.

use std::time::Duration;
use thiserror::Error;

/// Boxed cause carried by upstream failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the registry and by adapters.
#[derive(Debug, Error)]
pub enum NodeError {
    /// No adapter is registered under the requested asset id.
    #[error("could not find client named: {asset_id}, have you registered the client")]
    NotFound { asset_id: String },

    /// The adapter failed talking to its backend.
    #[error("{asset_id} {operation} failed: {source}")]
    Upstream {
        asset_id: String,
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// The adapter does not implement an optional capability.
    #[error("client {asset_id} does not support {capability}")]
    CapabilityUnsupported {
        asset_id: String,
        capability: &'static str,
    },

    /// The client-side wait expired. The backend call may still be running.
    #[error("{operation} timed out after {}ms", after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// A caller-supplied value could not be understood by the adapter.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl NodeError {
    /// Wrap a backend failure with the adapter and call it came from.
    pub fn upstream(
        asset_id: impl Into<String>,
        operation: &'static str,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Upstream {
            asset_id: asset_id.into(),
            operation,
            source: source.into(),
        }
    }

    pub fn not_found(asset_id: impl Into<String>) -> Self {
        Self::NotFound {
            asset_id: asset_id.into(),
        }
    }

    /// Whether the failure means "stopped waiting" rather than "failed".
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type for adapter and registry operations.
pub type NodeResult<T> = Result<T, NodeError>;
