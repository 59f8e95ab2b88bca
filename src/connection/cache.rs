//! Per-host session cache.
//!
//! # Responsibilities
//! - Hand out one live session per host, opening it on first use
//! - Probe new sessions before they become visible to other callers
//! - Close and forget sessions on request
//!
//! # Data Flow
//! ```text
//! connect(host) ─▶ cached? ─yes─▶ session
//!                     │no
//!                     ▼
//!                 open ─▶ ping ─▶ insert (first writer wins) ─▶ session
//! ```
//!
//! # Design Decisions
//! - Keyed on host only. A cached session is returned even when the caller
//!   passes different port, database or credentials
//! - Failed opens and pings leave nothing behind
//! - Two racing connects may both dial; the loser closes its session and
//!   returns the stored one

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::connection::clickhouse::ClickHouseDialer;
use crate::connection::driver::{DialTarget, Dialer, Session, SessionOptions};
use crate::connection::error::{ConnectError, ConnectResult};
use crate::observability::metrics::{self, ConnectOutcome};

struct CachedSession<S> {
    dsn: String,
    session: Arc<S>,
}

/// Host-keyed cache of live sessions.
pub struct ConnectionCache<D: Dialer = ClickHouseDialer> {
    dialer: D,
    options: SessionOptions,
    sessions: DashMap<String, CachedSession<D::Session>>,
}

impl<D: Dialer> ConnectionCache<D> {
    pub fn new(dialer: D, options: SessionOptions) -> Self {
        Self {
            dialer,
            options,
            sessions: DashMap::new(),
        }
    }

    /// Return the cached session for `host`, or open, probe and cache a new one.
    pub async fn connect(
        &self,
        host: &str,
        port: u16,
        database: &str,
        user: &str,
        password: &str,
    ) -> ConnectResult<Arc<D::Session>> {
        if let Some(session) = self.lookup(host) {
            metrics::record_connect(ConnectOutcome::Cached);
            return Ok(session);
        }

        let target = DialTarget::new(host, port, database, user, password);
        let dsn = target.redacted_dsn();
        tracing::debug!(host = %host, dsn = %dsn, "Opening session");

        let session = match self.dialer.open(&target, &self.options).await {
            Ok(session) => session,
            Err(source) => {
                tracing::error!(host = %host, dsn = %dsn, error = %source, "Failed to open session");
                metrics::record_connect(ConnectOutcome::OpenFailed);
                return Err(ConnectError::Open {
                    host: host.to_string(),
                    source,
                });
            }
        };

        if let Err(source) = session.ping().await {
            tracing::error!(host = %host, dsn = %dsn, error = %source, "Session failed liveness probe");
            session.close();
            metrics::record_connect(ConnectOutcome::PingFailed);
            return Err(ConnectError::Ping {
                host: host.to_string(),
                source,
            });
        }

        let (session, outcome) = self.store(&target, session);
        match outcome {
            ConnectOutcome::Raced => {
                tracing::debug!(host = %host, "Lost connect race, reusing stored session");
            }
            _ => {
                tracing::info!(host = %host, dsn = %dsn, "Session established");
            }
        }
        metrics::record_connect(outcome);
        metrics::record_cache_size(self.sessions.len());
        Ok(session)
    }

    /// Insert a probed session unless another caller stored one first, in
    /// which case `session` is closed and the stored one returned.
    fn store(&self, target: &DialTarget, session: D::Session) -> (Arc<D::Session>, ConnectOutcome) {
        match self.sessions.entry(target.host.clone()) {
            Entry::Occupied(existing) => {
                session.close();
                (existing.get().session.clone(), ConnectOutcome::Raced)
            }
            Entry::Vacant(slot) => {
                let session = Arc::new(session);
                slot.insert(CachedSession {
                    dsn: target.dsn(),
                    session: session.clone(),
                });
                (session, ConnectOutcome::Opened)
            }
        }
    }

    /// Cached session for `host`. Never dials.
    pub fn lookup(&self, host: &str) -> Option<Arc<D::Session>> {
        self.sessions.get(host).map(|entry| entry.session.clone())
    }

    /// Close and forget the sessions of `hosts`. Absent hosts are skipped.
    pub fn evict<I, S>(&self, hosts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for host in hosts {
            let host = host.as_ref();
            if let Some((_, cached)) = self.sessions.remove(host) {
                cached.session.close();
                tracing::info!(host = %host, "Session closed");
            }
        }
        metrics::record_cache_size(self.sessions.len());
    }

    /// Credentials-bearing DSN the session for `host` was opened with.
    pub fn dsn(&self, host: &str) -> Option<String> {
        self.sessions.get(host).map(|entry| entry.dsn.clone())
    }

    /// Cached hosts, sorted.
    pub fn hosts(&self) -> Vec<String> {
        let mut hosts: Vec<_> = self.sessions.iter().map(|e| e.key().clone()).collect();
        hosts.sort_unstable();
        hosts
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn dialer(&self) -> &D {
        &self.dialer
    }
}

impl Default for ConnectionCache<ClickHouseDialer> {
    fn default() -> Self {
        Self::new(ClickHouseDialer, SessionOptions::default())
    }
}
