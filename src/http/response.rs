//! Response envelope and error mapping.
//!
//! # Responsibilities
//! - Wrap every payload in `{"retCode", "retMsg", "entity"}`
//! - Map domain errors to a return code and HTTP status
//!
//! # Design Decisions
//! - Handlers return `Result<ApiResponse<T>, ApiError>`; the error side
//!   renders itself through `IntoResponse`
//! - Error details go to `retMsg`, `entity` is null on failure

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::connection::DriverError;
use crate::schema_ui::CatalogError;

pub const SUCCESS: &str = "0000";
pub const INVALID_PARAMS: &str = "5000";
pub const CONNECTION_NOT_FOUND: &str = "5100";
pub const QUERY_FAILED: &str = "5101";
pub const GET_SCHEMA_UI_FAILED: &str = "5210";

/// The JSON envelope every endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub ret_code: String,
    pub ret_msg: String,
    pub entity: Option<T>,
}

/// Successful response carrying `entity`.
pub struct ApiResponse<T>(pub T);

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(Envelope {
            ret_code: SUCCESS.to_string(),
            ret_msg: "success".to_string(),
            entity: Some(self.0),
        })
        .into_response()
    }
}

/// Errors surfaced to API clients.
#[derive(Debug)]
pub enum ApiError {
    InvalidParams(String),
    Schema(CatalogError),
    NotConnected(String),
    Query(DriverError),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidParams(_) => INVALID_PARAMS,
            ApiError::Schema(CatalogError::MissingKind) => INVALID_PARAMS,
            ApiError::Schema(_) => GET_SCHEMA_UI_FAILED,
            ApiError::NotConnected(_) => CONNECTION_NOT_FOUND,
            ApiError::Query(_) => QUERY_FAILED,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidParams(_) | ApiError::Schema(_) => StatusCode::BAD_REQUEST,
            ApiError::NotConnected(_) => StatusCode::NOT_FOUND,
            ApiError::Query(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidParams(msg) => format!("invalid params: {}", msg),
            ApiError::Schema(e) => e.to_string(),
            ApiError::NotConnected(host) => format!("no cached connection for {}", host),
            ApiError::Query(e) => e.to_string(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError::Schema(e)
    }
}

impl From<DriverError> for ApiError {
    fn from(e: DriverError) -> Self {
        ApiError::Query(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::InvalidParams(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::InvalidParams(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        tracing::warn!(code = self.code(), status = status.as_u16(), error = %message, "Request failed");

        let body = Envelope::<()> {
            ret_code: self.code().to_string(),
            ret_msg: message,
            entity: None,
        };
        (status, Json(body)).into_response()
    }
}
