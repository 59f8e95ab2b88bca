//! Shard availability probing.
//!
//! # Responsibilities
//! - Find one reachable replica per shard
//! - Collapse partial results: every shard reachable or nothing
//!
//! # Data Flow
//! ```text
//! topology ─▶ shard 0: replica a ✗ → replica b ✓ ─┐
//!          ─▶ shard 1: replica c ✓ ───────────────┼─▶ [b, c]
//!          ─▶ shard 2: replica d ✗ → replica e ✗ ─┘     (or [] if any ✗)
//! ```
//!
//! # Design Decisions
//! - Shards are probed concurrently, replicas in listed order; the first
//!   reachable replica ends its shard's walk
//! - Successful sessions stay in the connection cache
//! - Per-replica errors are logged, never returned

use std::sync::Arc;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use crate::connection::{ConnectionCache, Dialer};
use crate::model::{ClusterConfig, DEFAULT_DATABASE};
use crate::observability::metrics;

/// Ordered shards, each an ordered list of replica hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTopology {
    pub shards: Vec<Vec<String>>,
}

impl ShardTopology {
    pub fn new(shards: Vec<Vec<String>>) -> Self {
        Self { shards }
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}

impl From<&ClusterConfig> for ShardTopology {
    fn from(config: &ClusterConfig) -> Self {
        Self {
            shards: config
                .shards
                .iter()
                .map(|shard| shard.replicas.iter().map(|r| r.ip.clone()).collect())
                .collect(),
        }
    }
}

/// Outcome of probing one shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardReport {
    /// Position in the topology.
    pub shard: usize,
    /// First reachable replica.
    pub host: Option<String>,
    /// Last replica failure, kept even when a later replica succeeded.
    pub last_error: Option<String>,
}

/// Collapsed hosts alongside the per-shard detail they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// One host per shard, or empty when any shard is down.
    pub hosts: Vec<String>,
    pub shards: Vec<ShardReport>,
}

/// Probes shard topologies through a shared connection cache.
pub struct ShardProber<D: Dialer> {
    cache: Arc<ConnectionCache<D>>,
}

impl<D: Dialer> ShardProber<D> {
    pub fn new(cache: Arc<ConnectionCache<D>>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<ConnectionCache<D>> {
        &self.cache
    }

    /// One reachable host per shard, in shard order, or an empty list when
    /// any shard has no reachable replica.
    pub async fn probe(
        &self,
        topology: &ShardTopology,
        port: u16,
        user: &str,
        password: &str,
    ) -> Vec<String> {
        self.probe_outcome(topology, port, user, password).await.hosts
    }

    /// `probe` plus the per-shard reports behind its answer.
    pub async fn probe_outcome(
        &self,
        topology: &ShardTopology,
        port: u16,
        user: &str,
        password: &str,
    ) -> ProbeOutcome {
        let shards = self.probe_report(topology, port, user, password).await;

        let last_error = shards.iter().rev().find_map(|r| r.last_error.as_deref());
        let hosts: Vec<String> = shards.iter().filter_map(|r| r.host.clone()).collect();

        if hosts.len() < topology.len() {
            tracing::error!(
                reachable = hosts.len(),
                shards = topology.len(),
                error = last_error.unwrap_or("none"),
                "Cluster unavailable: not every shard has a reachable replica"
            );
            metrics::record_probe("unavailable");
            return ProbeOutcome {
                hosts: Vec::new(),
                shards,
            };
        }

        tracing::debug!(hosts = ?hosts, "Available hosts");
        metrics::record_probe("available");
        ProbeOutcome { hosts, shards }
    }

    /// Per-shard outcome, in topology order.
    pub async fn probe_report(
        &self,
        topology: &ShardTopology,
        port: u16,
        user: &str,
        password: &str,
    ) -> Vec<ShardReport> {
        let probes = topology
            .shards
            .iter()
            .enumerate()
            .map(|(index, replicas)| self.probe_shard(index, replicas, port, user, password));
        join_all(probes).await
    }

    async fn probe_shard(
        &self,
        shard: usize,
        replicas: &[String],
        port: u16,
        user: &str,
        password: &str,
    ) -> ShardReport {
        let mut last_error = None;
        for replica in replicas {
            match self
                .cache
                .connect(replica, port, DEFAULT_DATABASE, user, password)
                .await
            {
                Ok(_) => {
                    return ShardReport {
                        shard,
                        host: Some(replica.clone()),
                        last_error,
                    };
                }
                Err(e) => {
                    tracing::warn!(shard, host = %replica, error = %e, "Replica unreachable");
                    last_error = Some(e.to_string());
                }
            }
        }
        ShardReport {
            shard,
            host: None,
            last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::cache::tests::MockDialer;
    use crate::connection::SessionOptions;
    use crate::model::{Replica, Shard};
    use std::sync::atomic::Ordering;

    fn topology(shards: &[&[&str]]) -> ShardTopology {
        ShardTopology::new(
            shards
                .iter()
                .map(|s| s.iter().map(|h| h.to_string()).collect())
                .collect(),
        )
    }

    fn prober(dialer: MockDialer) -> ShardProber<MockDialer> {
        ShardProber::new(Arc::new(ConnectionCache::new(dialer, SessionOptions::default())))
    }

    #[tokio::test]
    async fn test_dead_shard_empties_result() {
        let prober = prober(MockDialer::with_dead(&["b1", "b2"]));
        let topology = topology(&[&["a1", "a2"], &["b1", "b2"], &["c1", "c2"]]);

        assert!(prober.probe(&topology, 9000, "u", "p").await.is_empty());

        let reports = prober.probe_report(&topology, 9000, "u", "p").await;
        assert_eq!(reports[0].host.as_deref(), Some("a1"));
        assert_eq!(reports[1].host, None);
        assert!(reports[1].last_error.as_deref().unwrap().contains("b2"));
        assert_eq!(reports[2].host.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_outcome_keeps_detail_when_collapsed() {
        let prober = prober(MockDialer::with_dead(&["b1"]));
        let outcome = prober
            .probe_outcome(&topology(&[&["a1"], &["b1"]]), 9000, "u", "p")
            .await;
        assert!(outcome.hosts.is_empty());
        assert_eq!(outcome.shards.len(), 2);
        assert_eq!(outcome.shards[0].host.as_deref(), Some("a1"));
        assert!(outcome.shards[1].last_error.is_some());

        let prober = self::prober(MockDialer::default());
        let outcome = prober
            .probe_outcome(&topology(&[&["a1"], &["b1"]]), 9000, "u", "p")
            .await;
        assert_eq!(outcome.hosts, vec!["a1", "b1"]);
        assert!(outcome.shards.iter().all(|r| r.last_error.is_none()));
    }

    #[tokio::test]
    async fn test_first_replicas_reachable() {
        let prober = prober(MockDialer::default());
        let topology = topology(&[&["a1", "a2"], &["b1", "b2"]]);

        let hosts = prober.probe(&topology, 9000, "u", "p").await;
        assert_eq!(hosts, vec!["a1", "b1"]);

        let dialed = prober.cache().dialer().dialed.lock().unwrap().clone();
        assert!(!dialed.contains(&"a2".to_string()));
        assert!(!dialed.contains(&"b2".to_string()));
    }

    #[tokio::test]
    async fn test_falls_through_to_next_replica() {
        let prober = prober(MockDialer::with_dead(&["a1"]));
        let topology = topology(&[&["a1", "a2"], &["b1"]]);

        assert_eq!(prober.probe(&topology, 9000, "u", "p").await, vec!["a2", "b1"]);
        assert!(prober.cache().lookup("a1").is_none());
        assert!(prober.cache().lookup("a2").is_some());
    }

    #[tokio::test]
    async fn test_empty_topology() {
        let prober = prober(MockDialer::default());
        assert!(prober.probe(&ShardTopology::default(), 9000, "u", "p").await.is_empty());
        assert_eq!(prober.cache().len(), 0);
    }

    #[tokio::test]
    async fn test_reprobe_reuses_sessions() {
        let prober = prober(MockDialer::default());
        let topology = topology(&[&["a1"], &["b1"]]);
        prober.probe(&topology, 9000, "u", "p").await;
        prober.probe(&topology, 9000, "u", "p").await;
        assert_eq!(prober.cache().dialer().opens.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_topology_from_cluster() {
        let config = ClusterConfig {
            shards: vec![
                Shard {
                    replicas: vec![
                        Replica { ip: "10.0.0.1".into(), ..Default::default() },
                        Replica { ip: "10.0.0.2".into(), ..Default::default() },
                    ],
                },
                Shard {
                    replicas: vec![Replica { ip: "10.0.0.3".into(), ..Default::default() }],
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            ShardTopology::from(&config),
            topology(&[&["10.0.0.1", "10.0.0.2"], &["10.0.0.3"]])
        );
    }
}
