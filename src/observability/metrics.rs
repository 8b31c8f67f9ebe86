//! Metrics collection and exposition.
//!
//! # Metrics
//! - `view_resolutions_total` (counter): resolved locators by kind
//! - `view_forced_responses_total` (counter): responses taken from the override slot
//! - `view_oracle_failures_total` (counter): route oracle failures recovered as "no route"
//! - `view_resolution_errors_total` (counter): fatal resolution errors by kind
//! - `view_requests_total` (counter): served requests by method and status

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(kind: &'static str) {
    metrics::counter!("view_resolutions_total", "kind" => kind).increment(1);
}

pub fn record_forced_response() {
    metrics::counter!("view_forced_responses_total").increment(1);
}

pub fn record_oracle_failure() {
    metrics::counter!("view_oracle_failures_total").increment(1);
}

pub fn record_resolution_error(error: &'static str) {
    metrics::counter!("view_resolution_errors_total", "error" => error).increment(1);
}

pub fn record_request(method: &str, status: u16) {
    metrics::counter!(
        "view_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
