//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

use clickhouse_admin::connection::{
    ConnectionCache, DialTarget, Dialer, DriverError, Session, SessionOptions,
};
use clickhouse_admin::http::{build_router, AppState};
use clickhouse_admin::packages::{InventoryError, PackageInventory};
use clickhouse_admin::schema_ui::SchemaCatalog;

/// Session kept in memory; answers every query with a one-table listing.
#[derive(Debug)]
pub struct FakeSession {
    pub host: String,
    pub closed: AtomicBool,
}

impl Session for FakeSession {
    async fn ping(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn query(&self, _sql: &str) -> Result<String, DriverError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DriverError::Closed);
        }
        Ok(format!("default\tevents_{}\n", self.host))
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Dialer whose `dead` hosts refuse to open.
#[derive(Default)]
pub struct FakeDialer {
    pub dead: HashSet<String>,
    pub opens: AtomicUsize,
    pub dialed: Mutex<Vec<String>>,
}

impl FakeDialer {
    pub fn with_dead(hosts: &[&str]) -> Self {
        Self {
            dead: hosts.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl Dialer for FakeDialer {
    type Session = FakeSession;

    async fn open(
        &self,
        target: &DialTarget,
        _options: &SessionOptions,
    ) -> Result<FakeSession, DriverError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.dialed.lock().unwrap().push(target.host.clone());
        if self.dead.contains(&target.host) {
            return Err(DriverError::InvalidTarget(format!("{} refused", target.host)));
        }
        Ok(FakeSession {
            host: target.host.clone(),
            closed: AtomicBool::new(false),
        })
    }
}

/// Inventory with a fixed version list.
pub struct FixedInventory(pub Vec<&'static str>);

impl PackageInventory for FixedInventory {
    fn versions(&self) -> Result<Vec<String>, InventoryError> {
        Ok(self.0.iter().map(|v| v.to_string()).collect())
    }
}

/// Router over a fake dialer, plus its state for inspection.
pub fn test_app(dialer: FakeDialer) -> (Router, AppState<FakeDialer>) {
    let catalog = Arc::new(SchemaCatalog::new(Arc::new(FixedInventory(vec![
        "23.3.1.2823",
        "22.8.9.24",
    ]))));
    let connections = Arc::new(ConnectionCache::new(dialer, SessionOptions::default()));
    let state = AppState::new(catalog, connections);
    (build_router(state.clone(), Duration::from_secs(5)), state)
}

/// Drive one request through the router and decode the JSON envelope.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Start a fake ClickHouse HTTP endpoint. `respond` maps (user, query) to
/// (status, body).
pub async fn start_fake_clickhouse<F>(respond: F) -> SocketAddr
where
    F: Fn(&str, &str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let respond = respond.clone();
                    tokio::spawn(async move {
                        let Some((user, body)) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, payload) = respond(&user, &body);
                        let status_text = match status {
                            200 => "200 OK",
                            516 => "516 Unknown",
                            _ => "500 Internal Server Error",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            payload.len(),
                            payload
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let header = |name: &str| {
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    };
    let length: usize = header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let user = header("x-clickhouse-user").unwrap_or_default();

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    Some((user, body))
}
