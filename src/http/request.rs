//! Request ID generation.
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A caller-supplied `x-request-id` is kept as-is
//! - The ID is echoed back on the response

use axum::http::{HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of an inbound request, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
