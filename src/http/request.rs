//! Request identification.
//!
//! # Responsibilities
//! - Assign a UUID request ID to every request lacking one
//! - Echo the ID back on the response
//!
//! # Design Decisions
//! - The set layer sits outside `TraceLayer` so spans carry the ID
//! - A client-supplied `x-request-id` is kept as is

use axum::http::HeaderName;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: &str = "x-request-id";

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}
