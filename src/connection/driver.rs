//! Database driver contract.
//!
//! # Responsibilities
//! - Describe where and how to open a session (`DialTarget`, `SessionOptions`)
//! - Define the seam between the connection cache and the transport
//!   (`Dialer` opens, `Session` probes, queries and closes)
//!
//! # Design Decisions
//! - Opening does not imply liveness; the cache probes explicitly
//! - Connection limits are explicit options, never transport defaults

use std::fmt;
use std::future::Future;
use std::time::Duration;

use url::form_urlencoded::byte_serialize;

use crate::config::schema::ConnectionConfig;
use crate::connection::error::DriverError;

/// Per-session transport policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Concurrent channels allowed on one session.
    pub max_open_conns: usize,
    /// Idle channels kept by the transport.
    pub max_idle_conns: usize,
    /// Lifetime of an idle channel.
    pub idle_timeout: Duration,
    /// Deadline for establishing a channel.
    pub connect_timeout: Duration,
    /// Port of the HTTP interface the transport talks to. The target's port
    /// is the native protocol port and only shapes the DSN.
    pub http_port: u16,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_open_conns: 1,
            max_idle_conns: 0,
            idle_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            http_port: 8123,
        }
    }
}

impl From<&ConnectionConfig> for SessionOptions {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            max_open_conns: config.max_open_conns,
            max_idle_conns: config.max_idle_conns,
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            http_port: config.http_port,
        }
    }
}

/// Everything needed to open a session to one node.
#[derive(Clone, PartialEq, Eq)]
pub struct DialTarget {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DialTarget {
    pub fn new(host: &str, port: u16, database: &str, user: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            database: database.to_string(),
            user: user.to_string(),
            password: password.to_string(),
        }
    }

    /// `tcp://host:port?database=..&username=..&password=..` with the query
    /// values percent-encoded.
    pub fn dsn(&self) -> String {
        self.format_dsn(&self.password)
    }

    /// The DSN with the password masked, for logs.
    pub fn redacted_dsn(&self) -> String {
        self.format_dsn("***")
    }

    fn format_dsn(&self, password: &str) -> String {
        format!(
            "tcp://{}:{}?database={}&username={}&password={}",
            self.host,
            self.port,
            encode(&self.database),
            encode(&self.user),
            encode(password),
        )
    }
}

impl fmt::Debug for DialTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// An open database session.
pub trait Session: Send + Sync + 'static {
    /// Round trip to the server.
    fn ping(&self) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Run `sql` and return the raw tab-separated response body.
    fn query(&self, sql: &str) -> impl Future<Output = Result<String, DriverError>> + Send;

    /// Release the session. Later use fails with `DriverError::Closed`.
    fn close(&self);
}

/// Opens sessions for the connection cache.
pub trait Dialer: Send + Sync + 'static {
    type Session: Session;

    fn open(
        &self,
        target: &DialTarget,
        options: &SessionOptions,
    ) -> impl Future<Output = Result<Self::Session, DriverError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsn_encoding() {
        let target = DialTarget::new("10.0.0.1", 9000, "default", "ck user", "p@ss&w=rd");
        assert_eq!(
            target.dsn(),
            "tcp://10.0.0.1:9000?database=default&username=ck+user&password=p%40ss%26w%3Drd"
        );
        assert_eq!(
            target.redacted_dsn(),
            "tcp://10.0.0.1:9000?database=default&username=ck+user&password=***"
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let target = DialTarget::new("h", 1, "d", "u", "secret");
        assert!(!format!("{:?}", target).contains("secret"));
    }

    #[test]
    fn test_default_options() {
        let options = SessionOptions::default();
        assert_eq!(options.max_open_conns, 1);
        assert_eq!(options.max_idle_conns, 0);
        assert_eq!(options.idle_timeout, Duration::from_secs(10));
        assert_eq!(options.http_port, 8123);
        assert_eq!(SessionOptions::from(&ConnectionConfig::default()), options);
    }
}
