//! Bounded wait for backend calls that may block for hours.
//!
//! # States
//! - NotStarted: nothing submitted yet
//! - InFlight: background call running, caller still waiting
//! - Completed: backend finished the side effect
//! - AlreadyInProgress: backend reports the side effect already started or
//!   done; equivalent to success
//!
//! # State Transitions
//! ```text
//! NotStarted → InFlight: call spawned
//! InFlight → Completed: call returned success before the limit
//! InFlight → AlreadyInProgress: call reported a duplicate before the limit
//! InFlight → (Timeout error): limit elapsed, call left running
//! ```
//!
//! # Known Gap
//! A timed-out call is detached, not cancelled. It keeps running until the
//! backend answers, and nothing observes its result.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::observability::metrics;
use crate::transport::{NodeError, NodeResult};

/// Progress of a slow idempotent operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    NotStarted,
    InFlight,
    Completed,
    AlreadyInProgress,
}

impl OperationState {
    /// Whether the state counts as a successful outcome for the caller.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Completed | Self::AlreadyInProgress)
    }

    fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InFlight => "in_flight",
            Self::Completed => "completed",
            Self::AlreadyInProgress => "already_in_progress",
        }
    }
}

/// Races a backend call against a fixed client-side timeout.
#[derive(Debug, Clone)]
pub struct SlowOperation {
    name: &'static str,
    limit: Duration,
}

impl SlowOperation {
    pub fn new(name: &'static str, limit: Duration) -> Self {
        Self { name, limit }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Start `call` in the background and wait at most the configured limit.
    ///
    /// `call` resolves to [`OperationState::Completed`] or
    /// [`OperationState::AlreadyInProgress`] on success. When the limit
    /// elapses first this returns [`NodeError::Timeout`] and the call keeps
    /// running detached.
    pub async fn run<F>(&self, asset_id: &str, call: F) -> NodeResult<OperationState>
    where
        F: Future<Output = NodeResult<OperationState>> + Send + 'static,
    {
        let mut state = OperationState::NotStarted;
        tracing::debug!(asset_id = %asset_id, operation = self.name, state = ?state, "Starting slow operation");

        let handle = tokio::spawn(call);
        state = OperationState::InFlight;
        tracing::debug!(asset_id = %asset_id, operation = self.name, state = ?state, "Slow operation submitted");

        let result = match timeout(self.limit, handle).await {
            Ok(Ok(Ok(outcome))) => {
                state = outcome;
                Ok(outcome)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(join_err)) => Err(NodeError::upstream(asset_id, self.name, join_err)),
            Err(_) => {
                tracing::warn!(
                    asset_id = %asset_id,
                    operation = self.name,
                    limit_ms = self.limit.as_millis() as u64,
                    "Slow operation still in flight, no longer waiting"
                );
                Err(NodeError::Timeout {
                    operation: self.name,
                    after: self.limit,
                })
            }
        };

        let outcome = match &result {
            Ok(_) => state.label(),
            Err(NodeError::Timeout { .. }) => "timeout",
            Err(_) => "error",
        };
        metrics::record_slow_operation(self.name, outcome);
        tracing::debug!(asset_id = %asset_id, operation = self.name, outcome, "Slow operation finished waiting");

        result
    }
}
