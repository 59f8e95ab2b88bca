//! ClickHouse driver over the HTTP interface.
//!
//! # Responsibilities
//! - Open sessions whose transport honors `SessionOptions`
//! - Run queries with credentials in `X-ClickHouse-User` / `X-ClickHouse-Key`
//! - Gate each session to `max_open_conns` concurrent queries
//! - Talk to `SessionOptions::http_port`; the target's native port stays in
//!   the DSN only
//!
//! # Design Decisions
//! - The reqwest pool keeps `max_idle_conns` idle sockets for at most
//!   `idle_timeout`; dropping idle sockets never invalidates the session
//! - Query bodies are sent as POST so long statements are not truncated

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Client;
use tokio::sync::Semaphore;
use url::Url;

use crate::connection::driver::{DialTarget, Dialer, Session, SessionOptions};
use crate::connection::error::DriverError;

/// Opens `ClickHouseSession`s.
#[derive(Debug, Clone, Default)]
pub struct ClickHouseDialer;

impl Dialer for ClickHouseDialer {
    type Session = ClickHouseSession;

    async fn open(
        &self,
        target: &DialTarget,
        options: &SessionOptions,
    ) -> Result<ClickHouseSession, DriverError> {
        let host = if target.host.contains(':') && !target.host.starts_with('[') {
            format!("[{}]", target.host)
        } else {
            target.host.clone()
        };
        let mut endpoint = Url::parse(&format!("http://{}:{}/", host, options.http_port))
            .map_err(|e| DriverError::InvalidTarget(format!("{}: {}", target.host, e)))?;
        endpoint
            .query_pairs_mut()
            .append_pair("database", &target.database);

        let client = Client::builder()
            .pool_max_idle_per_host(options.max_idle_conns)
            .pool_idle_timeout(options.idle_timeout)
            .connect_timeout(options.connect_timeout)
            .no_proxy()
            .build()?;

        Ok(ClickHouseSession {
            client,
            endpoint,
            user: target.user.clone(),
            password: target.password.clone(),
            permits: Semaphore::new(options.max_open_conns.max(1)),
            closed: AtomicBool::new(false),
        })
    }
}

/// A session against one ClickHouse node.
#[derive(Debug)]
pub struct ClickHouseSession {
    client: Client,
    endpoint: Url,
    user: String,
    password: String,
    permits: Semaphore,
    closed: AtomicBool,
}

impl ClickHouseSession {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Session for ClickHouseSession {
    async fn ping(&self) -> Result<(), DriverError> {
        let body = self.query("SELECT 1").await?;
        match body.trim() {
            "1" => Ok(()),
            other => Err(DriverError::Protocol(format!("SELECT 1 returned '{}'", other))),
        }
    }

    async fn query(&self, sql: &str) -> Result<String, DriverError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DriverError::Closed);
        }
        let _permit = self.permits.acquire().await.map_err(|_| DriverError::Closed)?;

        tracing::trace!(endpoint = %self.endpoint, sql = %sql, "Running query");
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("X-ClickHouse-User", &self.user)
            .header("X-ClickHouse-Key", &self.password)
            .body(sql.to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DriverError::Server {
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }
        Ok(body)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_session_rejects_queries() {
        let target = DialTarget::new("127.0.0.1", 9000, "default", "default", "");
        let session = ClickHouseDialer
            .open(&target, &SessionOptions::default())
            .await
            .unwrap();
        assert_eq!(session.endpoint.as_str(), "http://127.0.0.1:8123/?database=default");
        assert!(target.dsn().starts_with("tcp://127.0.0.1:9000?"));

        session.close();
        assert!(session.is_closed());
        assert!(matches!(session.query("SELECT 1").await, Err(DriverError::Closed)));
    }

    #[tokio::test]
    async fn test_unreachable_ping_fails() {
        // Port 1 is reserved and closed on test hosts.
        let target = DialTarget::new("127.0.0.1", 9000, "default", "default", "");
        let options = SessionOptions {
            http_port: 1,
            ..SessionOptions::default()
        };
        let session = ClickHouseDialer
            .open(&target, &options)
            .await
            .unwrap();
        assert!(matches!(session.ping().await, Err(DriverError::Http(_))));
    }
}
