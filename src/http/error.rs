//! Degraded responses for failed fetches.
//!
//! A transport failure is always a 502 with a short plain-text diagnostic,
//! for tools and browsers alike. There is no retry. An upstream that answered
//! with an error status is not a failure here; it is passed through or shown
//! in the preview.

use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::observability::metrics;
use crate::upstream::ForwardError;

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        metrics::record_upstream_failure(self.kind());
        (
            StatusCode::BAD_GATEWAY,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Proxy Error: {self}"),
        )
            .into_response()
    }
}
