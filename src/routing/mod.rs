//! Inbound request interpretation.
//!
//! # Data Flow
//! ```text
//! GET /api/...?url=...&format=...&raw=true
//!     → query.rs (split control params from pass-along params)
//!     → target.rs (TargetReference or "no target")
//!     → caller.rs (CallerClass + FormatSelection from User-Agent)
//!     → InboundRequest (immutable, request-scoped)
//! ```
//!
//! # Design Decisions
//! - Nothing here fails: a missing target is a help-page request, and a bad
//!   URL is left for the forwarder to reject
//! - Classification is a pure function of the identity string

pub mod caller;
pub mod query;
pub mod target;

use axum::http::{header::USER_AGENT, HeaderMap, HeaderValue, Uri};

pub use caller::{CallerClass, FormatSelection};
pub use query::QueryParams;
pub use target::{resolve_target, Scheme, TargetReference, ROUTE_PREFIX};

/// Everything the pipeline needs to know about one inbound request.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// Destination to fetch, `None` when the caller wants the help page.
    pub target: Option<TargetReference>,
    /// Heuristic classification of the caller.
    pub caller: CallerClass,
    /// Viewer's format hint, consulted only for `BrowserViewer`.
    pub format: FormatSelection,
    /// Caller asked for the unmodified body (`raw=true`).
    pub raw_override: bool,
    /// Caller's own `User-Agent`, kept as received.
    pub identity: Option<HeaderValue>,
}

impl InboundRequest {
    /// Interpret the request line and headers.
    pub fn from_parts(uri: &Uri, headers: &HeaderMap) -> Self {
        let query = QueryParams::parse(uri.query());
        let identity = headers.get(USER_AGENT).cloned();
        // Opaque bytes are classified on a lossy decode; upstream still
        // receives them untouched.
        let identity_str = identity
            .as_ref()
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
            .unwrap_or_default();

        Self {
            target: resolve_target(uri.path(), &query),
            caller: CallerClass::classify(&identity_str),
            format: FormatSelection::from_param(query.format.as_deref()),
            raw_override: query.raw,
            identity,
        }
    }
}
