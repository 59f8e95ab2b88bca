//! Cluster health.
//!
//! # Data Flow
//! ```text
//! ShardTopology (from request or ClusterConfig)
//!     → availability.rs probes replicas through the ConnectionCache
//!     → one host per shard, or nothing
//! ```

pub mod availability;

pub use availability::{ProbeOutcome, ShardProber, ShardReport, ShardTopology};
