//! Metrics collection and exposition.
//!
//! # Metrics
//! - `portal_submissions_total` (counter): submissions by outcome
//! - `portal_interactions_received_total` (counter): by source (history, live)
//! - `portal_log_size` (gauge): entries in the local interaction log
//! - `portal_active_listeners` (gauge): live event listeners
//! - `portal_rpc_healthy` (gauge): 1=reachable, 0=unreachable

use ::metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Install the Prometheus exporter with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_submission(outcome: &'static str) {
    counter!("portal_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_interactions_received(source: &'static str, count: usize) {
    counter!("portal_interactions_received_total", "source" => source).increment(count as u64);
}

pub fn record_log_size(len: usize) {
    gauge!("portal_log_size").set(len as f64);
}

pub fn record_active_listeners(count: usize) {
    gauge!("portal_active_listeners").set(count as f64);
}

pub fn record_rpc_health(healthy: bool) {
    gauge!("portal_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}
