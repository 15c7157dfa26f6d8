//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Slow idempotent backend call (e.g. importaddress):
//!     → timeouts.rs (spawn in background, race against client-side limit)
//!     → retries.rs (second attempt converges InFlight → AlreadyInProgress)
//! ```
//!
//! # Design Decisions
//! - Only the slow-operation path enforces its own deadline; ordinary adapter
//!   calls are bounded by each adapter's transport timeout
//! - A timeout means "stopped waiting": the background call is not cancelled
//! - No state is kept between invocations

pub mod retries;
pub mod timeouts;

pub use retries::{converge, CONVERGE_ATTEMPTS};
pub use timeouts::{OperationState, SlowOperation};
