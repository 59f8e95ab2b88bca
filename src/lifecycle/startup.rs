//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Build the core and bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::path::{Path, PathBuf};

use tokio::net::TcpListener;

use crate::config::{load_config, ServiceConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::observability::{logging, metrics};

/// Environment variable naming the config file when no path is given.
pub const CONFIG_ENV: &str = "CLICKHOUSE_ADMIN_CONFIG";

/// Config path from the first CLI argument, then `CONFIG_ENV`.
pub fn config_path(arg: Option<String>) -> Option<PathBuf> {
    arg.or_else(|| std::env::var(CONFIG_ENV).ok())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

/// Load `path`, or defaults when absent.
pub fn resolve_config(path: Option<&Path>) -> Result<ServiceConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(ServiceConfig::default()),
    }
}

/// Run the service until SIGINT or SIGTERM.
pub async fn run(path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(path.as_deref())?;
    logging::init(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?path,
        "clickhouse-admin starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        packages = %config.packages.directory,
        max_open_conns = config.connection.max_open_conns,
        idle_timeout_secs = config.connection.idle_timeout_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(&config);
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signals = spawn_signal_listener(shutdown.clone());
    server.run(listener, shutdown.subscribe()).await?;

    shutdown.trigger();
    let _ = signals.await;
    tracing::info!("Shutdown complete");
    Ok(())
}
