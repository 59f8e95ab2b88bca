//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared core (schema catalog, connection cache, prober)
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve until the shutdown coordinator fires

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::connection::{ClickHouseDialer, ConnectionCache, Dialer, SessionOptions};
use crate::health::ShardProber;
use crate::http::handlers::*;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::packages::PackageDirectory;
use crate::schema_ui::SchemaCatalog;

/// Application state injected into handlers.
pub struct AppState<D: Dialer = ClickHouseDialer> {
    pub catalog: Arc<SchemaCatalog>,
    pub prober: Arc<ShardProber<D>>,
}

impl<D: Dialer> AppState<D> {
    pub fn new(catalog: Arc<SchemaCatalog>, connections: Arc<ConnectionCache<D>>) -> Self {
        Self {
            catalog,
            prober: Arc::new(ShardProber::new(connections)),
        }
    }

    /// The cache shared with the prober.
    pub fn connections(&self) -> &Arc<ConnectionCache<D>> {
        self.prober.cache()
    }
}

impl<D: Dialer> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            prober: self.prober.clone(),
        }
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router<D: Dialer>(state: AppState<D>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/api/v1/ui/schema", get(get_schema::<D>))
        .route("/api/v1/ck/available", post(post_available::<D>))
        .route(
            "/api/v1/ck/connections",
            get(get_connections::<D>).delete(delete_connections::<D>),
        )
        .route("/api/v1/ck/tables/{host}", get(get_tables::<D>))
        .route("/api/v1/status", get(get_status::<D>))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
}

/// HTTP server for the admin API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ServiceConfig) -> Self {
        let inventory = Arc::new(PackageDirectory::new(PathBuf::from(
            &config.packages.directory,
        )));
        let catalog = Arc::new(SchemaCatalog::new(inventory));
        let connections = Arc::new(ConnectionCache::new(
            ClickHouseDialer,
            SessionOptions::from(&config.connection),
        ));

        let state = AppState::new(catalog, connections);
        let router = build_router(
            state.clone(),
            Duration::from_secs(config.timeouts.request_secs),
        );
        Self { router, state }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener, until
    /// `shutdown` fires. Cached sessions are closed on the way out.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        let connections = self.state.connections();
        connections.evict(connections.hosts());
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
