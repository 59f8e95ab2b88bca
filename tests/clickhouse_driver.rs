//! The HTTP driver against a fake ClickHouse endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clickhouse_admin::connection::{
    merge_tree_tables, ClickHouseDialer, ConnectError, ConnectionCache, DriverError, Session,
    SessionOptions,
};
use clickhouse_admin::health::{ShardProber, ShardTopology};

mod common;

/// Cache whose HTTP transport targets the fake endpoint on `http_port`.
fn cache(http_port: u16) -> ConnectionCache {
    let options = SessionOptions {
        http_port,
        ..SessionOptions::default()
    };
    ConnectionCache::new(ClickHouseDialer, options)
}

#[tokio::test]
async fn test_connect_pings_and_caches() {
    let queries = Arc::new(AtomicUsize::new(0));
    let seen = queries.clone();
    let addr = common::start_fake_clickhouse(move |_, sql| {
        seen.fetch_add(1, Ordering::SeqCst);
        match sql {
            "SELECT 1" => (200, "1\n".to_string()),
            _ => (200, "db\tevents\n".to_string()),
        }
    })
    .await;

    let cache = cache(addr.port());
    let host = addr.ip().to_string();
    let session = cache
        .connect(&host, 9000, "default", "default", "")
        .await
        .unwrap();
    assert_eq!(queries.load(Ordering::SeqCst), 1);
    assert_eq!(
        cache.dsn(&host).unwrap(),
        format!("tcp://{}:9000?database=default&username=default&password=", host)
    );

    let again = cache
        .connect(&host, 9000, "default", "other", "secret")
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&session, &again));
    assert_eq!(queries.load(Ordering::SeqCst), 1);

    let listing = merge_tree_tables(session.as_ref(), "MergeTree").await.unwrap();
    assert_eq!(listing.tables["db"], vec!["events"]);

    cache.evict([host.as_str()]);
    assert!(session.is_closed());
    assert!(matches!(session.query("SELECT 1").await, Err(DriverError::Closed)));
}

#[tokio::test]
async fn test_auth_failure_is_not_cached() {
    let addr = common::start_fake_clickhouse(|user, _| {
        if user == "admin" {
            (200, "1\n".to_string())
        } else {
            (516, "Code: 516. Authentication failed".to_string())
        }
    })
    .await;

    let cache = cache(addr.port());
    let host = addr.ip().to_string();
    let err = cache
        .connect(&host, 9000, "default", "guest", "")
        .await
        .unwrap_err();
    match err {
        ConnectError::Ping { host: failed, source: DriverError::Server { status, .. } } => {
            assert_eq!(failed, host);
            assert_eq!(status, 516);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(cache.is_empty());

    assert!(cache
        .connect(&host, 9000, "default", "admin", "")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_probe_over_http() {
    let addr = common::start_fake_clickhouse(|_, _| (200, "1\n".to_string())).await;
    let prober = ShardProber::new(Arc::new(cache(addr.port())));

    // The fake listens on 127.0.0.1 only; 127.0.0.2 refuses.
    let live = addr.ip().to_string();
    let topology = ShardTopology::new(vec![vec!["127.0.0.2".to_string(), live.clone()]]);
    let hosts = prober.probe(&topology, 9000, "default", "").await;
    assert_eq!(hosts, vec![live.clone()]);

    let partial = ShardTopology::new(vec![vec![live], vec!["127.0.0.2".to_string()]]);
    assert!(prober.probe(&partial, 9000, "default", "").await.is_empty());
    let reports = prober.probe_report(&partial, 9000, "default", "").await;
    assert!(reports[0].host.is_some());
    assert!(reports[1].host.is_none());
}
