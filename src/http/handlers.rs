//! API handlers.
//!
//! Handlers are thin: decode the request, call one core operation, wrap the
//! result in the envelope.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::connection::{merge_tree_tables, Dialer, TableListing, MERGE_TREE_ENGINES};
use crate::health::{ShardReport, ShardTopology};
use crate::http::response::{ApiError, ApiResponse};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::params::FieldSchema;

#[derive(Debug, Deserialize)]
pub struct SchemaQuery {
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Availability probe request. Shards are ordered lists of replica hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableRequest {
    pub shards: Vec<Vec<String>>,
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Include per-shard detail in the response.
    #[serde(default)]
    pub report: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailableResponse {
    pub hosts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shards: Option<Vec<ShardReport>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvictRequest {
    pub hosts: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionsStatus {
    pub hosts: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TablesQuery {
    pub engine: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub schemas: Vec<&'static str>,
    pub connections: Vec<String>,
}

pub async fn get_schema<D: Dialer>(
    State(state): State<AppState<D>>,
    query: Result<Query<SchemaQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<FieldSchema>>, ApiError> {
    let Query(query) = query?;
    let label = state.catalog.kind_label(&query.kind);
    match state.catalog.get_schema(&query.kind) {
        Ok(schema) => {
            metrics::record_schema_request(label, "ok");
            Ok(ApiResponse(schema))
        }
        Err(e) => {
            metrics::record_schema_request(label, "error");
            Err(e.into())
        }
    }
}

pub async fn post_available<D: Dialer>(
    State(state): State<AppState<D>>,
    body: Result<Json<AvailableRequest>, JsonRejection>,
) -> Result<ApiResponse<AvailableResponse>, ApiError> {
    let Json(req) = body?;
    if req.port == 0 {
        return Err(ApiError::InvalidParams("port must be non-zero".to_string()));
    }

    let topology = ShardTopology::new(req.shards);
    let outcome = state
        .prober
        .probe_outcome(&topology, req.port, &req.user, &req.password)
        .await;
    Ok(ApiResponse(AvailableResponse {
        hosts: outcome.hosts,
        shards: req.report.then_some(outcome.shards),
    }))
}

pub async fn delete_connections<D: Dialer>(
    State(state): State<AppState<D>>,
    body: Result<Json<EvictRequest>, JsonRejection>,
) -> Result<ApiResponse<ConnectionsStatus>, ApiError> {
    let Json(req) = body?;
    state.connections().evict(&req.hosts);
    Ok(ApiResponse(ConnectionsStatus {
        hosts: state.connections().hosts(),
    }))
}

pub async fn get_connections<D: Dialer>(
    State(state): State<AppState<D>>,
) -> ApiResponse<ConnectionsStatus> {
    ApiResponse(ConnectionsStatus {
        hosts: state.connections().hosts(),
    })
}

/// Lists tables through an already cached session; never dials.
pub async fn get_tables<D: Dialer>(
    State(state): State<AppState<D>>,
    Path(host): Path<String>,
    query: Result<Query<TablesQuery>, QueryRejection>,
) -> Result<ApiResponse<TableListing>, ApiError> {
    let Query(query) = query?;
    let session = state
        .connections()
        .lookup(&host)
        .ok_or_else(|| ApiError::NotConnected(host.clone()))?;

    let engine = query.engine.as_deref().unwrap_or(MERGE_TREE_ENGINES);
    let listing = merge_tree_tables(session.as_ref(), engine).await?;
    Ok(ApiResponse(listing))
}

pub async fn get_status<D: Dialer>(State(state): State<AppState<D>>) -> ApiResponse<SystemStatus> {
    ApiResponse(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        schemas: state.catalog.kinds(),
        connections: state.connections().hosts(),
    })
}
