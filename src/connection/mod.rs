//! ClickHouse connectivity.
//!
//! `driver` defines the seam and `clickhouse` implements it over HTTP.
//! `cache` keeps one live session per host; `tables` queries through one.

pub mod cache;
pub mod clickhouse;
pub mod driver;
pub mod error;
pub mod tables;

pub use cache::ConnectionCache;
pub use clickhouse::{ClickHouseDialer, ClickHouseSession};
pub use driver::{DialTarget, Dialer, Session, SessionOptions};
pub use error::{ConnectError, ConnectResult, DriverError};
pub use tables::{merge_tree_tables, TableListing, MERGE_TREE_ENGINES};
