//! Metrics collection and exposition.
//!
//! # Metrics
//! - `donation_outcomes_total` (counter): attempts by terminal outcome
//! - `donation_poll_ticks` (histogram): status queries per confirmation wait
//! - `donation_rpc_requests_total` (counter): JSON-RPC calls by method, result
//! - `donation_rpc_healthy` (gauge): 1=healthy, 0=unhealthy
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_donation_outcome(outcome: &'static str) {
    counter!("donation_outcomes_total", "outcome" => outcome).increment(1);
}

pub fn record_poll_ticks(ticks: u32) {
    histogram!("donation_poll_ticks").record(ticks as f64);
}

pub fn record_rpc_request(method: &str, ok: bool) {
    counter!(
        "donation_rpc_requests_total",
        "method" => method.to_string(),
        "result" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}

pub fn record_rpc_health(healthy: bool) {
    gauge!("donation_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}
