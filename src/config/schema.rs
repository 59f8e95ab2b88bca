//! Configuration schema definitions.
//!
//! This module defines the service configuration structure.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the admin service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    pub listener: ListenerConfig,

    /// Policy for cached ClickHouse sessions.
    pub connection: ConnectionConfig,

    /// Where installed ClickHouse packages live.
    pub packages: PackagesConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8808").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8808".to_string(),
        }
    }
}

/// Session policy applied to every cached connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Concurrent queries allowed per session.
    pub max_open_conns: usize,

    /// Idle sockets kept per session.
    pub max_idle_conns: usize,

    /// Idle socket lifetime in seconds.
    pub idle_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// ClickHouse HTTP interface port. Requests carry the native TCP port,
    /// which only appears in the DSN.
    pub http_port: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_open_conns: 1,
            max_idle_conns: 0,
            idle_timeout_secs: 10,
            connect_timeout_secs: 5,
            http_port: 8123,
        }
    }
}

/// Package inventory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PackagesConfig {
    /// Directory scanned for `clickhouse-common-static` packages.
    pub directory: String,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            directory: "package".to_string(),
        }
    }
}

/// Timeout configuration for API requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds. Covers availability probes.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
