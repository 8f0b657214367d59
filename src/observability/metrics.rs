//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relay calls by outcome
//! - `relay_request_duration_seconds` (histogram): full two-hop latency
//! - `backend_replies_total` (counter): service replies by service, status
//! - `backend_connections_total` (counter): accepted connections by service
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are static strings to keep cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::protocol::Status;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished relay call.
pub fn record_relay(outcome: &'static str, start: Instant) {
    metrics::counter!("relay_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("relay_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a reply written by a backend service.
pub fn record_backend_reply(service: &'static str, status: Status) {
    metrics::counter!(
        "backend_replies_total",
        "service" => service,
        "status" => status.as_str()
    )
    .increment(1);
}

/// Record a connection accepted by a backend service.
pub fn record_backend_connection(service: &'static str) {
    metrics::counter!("backend_connections_total", "service" => service).increment(1);
}
