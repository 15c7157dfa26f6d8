//! HTTP front end.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout, metrics)
//!     → handlers.rs (resolve asset id in the registry, call the adapter)
//!     → response.rs (data envelope or error code mapping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer, X_REQUEST_ID};
