//! Lifecycle metrics.
//!
//! # Metrics
//! - `worker_host_lifecycle_state` (gauge): ordinal of the current lifecycle state
//! - `worker_host_engine_starts_total` (counter): engine start attempts by outcome
//! - `worker_host_stop_requests_total` (counter): stop calls, split by whether they took effect

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::lifecycle::state::LifecycleState;

/// Install the Prometheus exporter on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_state(state: LifecycleState) {
    metrics::gauge!("worker_host_lifecycle_state").set(state as u8 as f64);
}

pub fn record_engine_start(outcome: &'static str) {
    metrics::counter!("worker_host_engine_starts_total", "outcome" => outcome).increment(1);
}

pub fn record_stop_request(effective: bool) {
    let effective = if effective { "true" } else { "false" };
    metrics::counter!("worker_host_stop_requests_total", "effective" => effective).increment(1);
}
