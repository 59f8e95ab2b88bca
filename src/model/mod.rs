//! Domain model for managed ClickHouse clusters.

pub mod cluster;

pub use cluster::{
    ClusterConfig, Disk, DiskHdfs, DiskLocal, DiskS3, Policy, Replica, Shard, Storage, Volume,
    DEFAULT_DATABASE,
};
