//! Metrics collection and exposition.
//!
//! # Metrics
//! - `oracle_requests_total` (counter): front-end requests by route, status
//! - `oracle_request_duration_seconds` (histogram): front-end latency by route
//! - `oracle_node_info_total` (counter): chain-state fetches by asset, outcome
//! - `oracle_node_up` (gauge): 1 if the last chain-state fetch succeeded
//! - `oracle_slow_operation_total` (counter): bounded waits by operation, outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   exporter every call is a no-op
//! - Labels stay low-cardinality: routes are templates, never raw paths

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one front-end request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    counter!("oracle_requests_total", "route" => route.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!("oracle_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a chain-state fetch for `asset_id`.
pub fn record_node_info(asset_id: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("oracle_node_info_total", "asset" => asset_id.to_string(), "outcome" => outcome)
        .increment(1);
    gauge!("oracle_node_up", "asset" => asset_id.to_string()).set(if ok { 1.0 } else { 0.0 });
}

/// Record how a bounded wait for a slow operation ended.
pub fn record_slow_operation(operation: &'static str, outcome: &'static str) {
    counter!("oracle_slow_operation_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}
