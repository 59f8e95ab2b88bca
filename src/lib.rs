//! ClickHouse cluster administration core.
//!
//! A schema registry that turns cluster configuration structures into
//! conditional, bilingual UI form descriptions, plus a per-host session cache
//! and a shard availability prober for live clusters.

pub mod config;
pub mod connection;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod packages;
pub mod params;
pub mod schema_ui;

pub use config::ServiceConfig;
pub use connection::ConnectionCache;
pub use health::ShardProber;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use params::ConfigParams;
pub use schema_ui::SchemaCatalog;
