//! ClickHouse admin service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ handlers ──┬──▶ schema_ui::SchemaCatalog
//!                                                 │        └─▶ params (registry, marshal)
//!                                                 │
//!                                                 └──▶ health::ShardProber
//!                                                          └─▶ connection::ConnectionCache
//!                                                                   └─▶ ClickHouse nodes
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```
//!
//! Usage: `clickhouse-admin [config.toml]`; the path may also come from
//! `CLICKHOUSE_ADMIN_CONFIG`.

use clickhouse_admin::lifecycle::startup;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = startup::config_path(std::env::args().nth(1));
    startup::run(path).await
}
