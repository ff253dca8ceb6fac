//! Presentation of the help page and the preview report.
//!
//! The pipeline hands a [`PreviewReport`] to a [`Presenter`] and sends back
//! whatever it renders. Presenters own all escaping of embedded content.

pub mod html;

use axum::http::StatusCode;

use crate::routing::{CallerClass, FormatSelection};

pub use html::HtmlPresenter;

/// Marker text of common anti-bot interstitials.
const CHALLENGE_MARKER: &str = "Just a moment";

/// Data behind the preview page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewReport {
    /// Resolved target URL.
    pub target: String,
    /// Status the upstream answered with (the page itself is always 200).
    pub upstream_status: u16,
    /// Decoded body, unescaped and untruncated.
    pub body: String,
    /// Body size in bytes as received.
    pub body_bytes: usize,
    pub elapsed_ms: u64,
    pub caller: CallerClass,
    pub format: FormatSelection,
    /// `User-Agent` that was presented upstream.
    pub presented_identity: String,
    /// Upstream looks like it blocked or challenged the request.
    pub blocked: bool,
    /// Link to the same request with `raw=true`.
    pub raw_link: String,
}

impl PreviewReport {
    /// Heuristic for WAF/anti-bot responses.
    pub fn looks_blocked(status: StatusCode, body: &str) -> bool {
        status == StatusCode::FORBIDDEN
            || status == StatusCode::SERVICE_UNAVAILABLE
            || body.contains(CHALLENGE_MARKER)
    }
}

/// Data behind the help page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpPage {
    /// Path the form submits `?url=` to.
    pub action: String,
}

/// Renders HTML documents for interactive callers.
pub trait Presenter: Send + Sync {
    fn render_help(&self, page: &HelpPage) -> String;

    fn render_preview(&self, report: &PreviewReport) -> String;
}
