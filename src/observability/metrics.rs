//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ldbws_requests_total` (counter): requests by operation, status
//! - `ldbws_request_duration_seconds` (histogram): end-to-end latency
//! - `ldbws_upstream_calls_total` (counter): SOAP calls by operation, outcome
//! - `ldbws_upstream_duration_seconds` (histogram): SOAP round-trip latency
//!
//! Recording without an installed exporter is a no-op, so tests and
//! metrics-disabled deployments pay nothing.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed inbound request.
pub fn record_request(operation: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "ldbws_requests_total",
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("ldbws_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

/// Record one upstream SOAP call.
pub fn record_upstream_call(operation: &'static str, success: bool, start: Instant) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!(
        "ldbws_upstream_calls_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!("ldbws_upstream_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
