//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define service metrics (connects, cache size, probes, schema requests)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `ck_connect_total` (counter): connect attempts by outcome
//! - `ck_connection_cache_size` (gauge): cached sessions
//! - `ck_probe_total` (counter): availability probes by outcome
//! - `ck_schema_requests_total` (counter): schema lookups by kind, outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Label values come from closed sets, never from request input

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

pub const CONNECT_TOTAL: &str = "ck_connect_total";
pub const CONNECTION_CACHE_SIZE: &str = "ck_connection_cache_size";
pub const PROBE_TOTAL: &str = "ck_probe_total";
pub const SCHEMA_REQUESTS_TOTAL: &str = "ck_schema_requests_total";

/// Install the Prometheus recorder and its HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(CONNECT_TOTAL, "Connect attempts by outcome");
            describe_gauge!(CONNECTION_CACHE_SIZE, "Cached ClickHouse sessions");
            describe_counter!(PROBE_TOTAL, "Shard availability probes by outcome");
            describe_counter!(SCHEMA_REQUESTS_TOTAL, "Schema lookups by kind and outcome");
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder");
        }
    }
}

/// How a connect call was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Served from the cache without dialing.
    Cached,
    /// Dialed, probed and stored.
    Opened,
    /// Dialed and probed, but another caller stored first.
    Raced,
    OpenFailed,
    PingFailed,
}

impl ConnectOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectOutcome::Cached => "cached",
            ConnectOutcome::Opened => "opened",
            ConnectOutcome::Raced => "raced",
            ConnectOutcome::OpenFailed => "open_failed",
            ConnectOutcome::PingFailed => "ping_failed",
        }
    }
}

pub fn record_connect(outcome: ConnectOutcome) {
    counter!(CONNECT_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

pub fn record_cache_size(size: usize) {
    gauge!(CONNECTION_CACHE_SIZE).set(size as f64);
}

/// `outcome` is `available` or `unavailable`.
pub fn record_probe(outcome: &'static str) {
    counter!(PROBE_TOTAL, "outcome" => outcome).increment(1);
}

/// `kind` must be a registered schema kind or `unknown`.
pub fn record_schema_request(kind: &'static str, outcome: &'static str) {
    counter!(SCHEMA_REQUESTS_TOTAL, "kind" => kind, "outcome" => outcome).increment(1);
}
