//! Retry policy for slow idempotent operations.
//!
//! # Responsibilities
//! - Re-run a slow operation a fixed number of times in sequence
//! - Stop at the first success or "already in progress" outcome
//!
//! # Design Decisions
//! - The first attempt usually times out while the backend starts the work;
//!   the second observes the duplicate and converges to success
//! - Only the error from the final attempt is propagated

use std::future::Future;

use crate::resilience::timeouts::OperationState;
use crate::transport::NodeResult;

/// Attempts used by adapters that import addresses.
pub const CONVERGE_ATTEMPTS: u32 = 2;

/// Run `attempt` up to `attempts` times until it reports a success state.
pub async fn converge<F, Fut>(attempts: u32, mut attempt: F) -> NodeResult<OperationState>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = NodeResult<OperationState>>,
{
    let attempts = attempts.max(1);
    let mut n = 1;

    loop {
        match attempt().await {
            Ok(state) => {
                tracing::debug!(attempt = n, state = ?state, "Operation converged");
                return Ok(state);
            }
            Err(e) if n < attempts => {
                tracing::info!(attempt = n, error = %e, "Operation attempt failed, retrying");
                n += 1;
            }
            Err(e) => {
                tracing::warn!(attempt = n, error = %e, "Operation failed on final attempt");
                return Err(e);
            }
        }
    }
}
