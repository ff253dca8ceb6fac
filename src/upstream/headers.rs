//! Outbound header construction.
//!
//! # Responsibilities
//! - Always send `Accept: */*` and a browser-like `Accept-Language`
//! - Pass a tool's `User-Agent` through untouched (upstreams pick the
//!   subscription format from it)
//! - Replace a browser's `User-Agent` with a client identity per format
//! - Disguise the request as same-origin via `Referer`/`Origin`
//!
//! `Host` is never set here; the client derives it from the URL.

use axum::http::header::{ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT};
use axum::http::{HeaderMap, HeaderValue};
use url::Url;

use crate::routing::{CallerClass, FormatSelection, TargetReference};

/// Identity used for `FormatSelection::Clash` and for tools that send none.
pub const DEFAULT_IDENTITY: &str = "Clash/Meta";

const SINGBOX_IDENTITY: &str = "sing-box/1.10.0";
const BASE64_IDENTITY: &str = "v2rayN/6.60";
const GENERIC_IDENTITY: &str = "ClashforWindows/0.20.39";

const ACCEPT_LANGUAGE_VALUE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Client identity presented upstream on behalf of a browser.
pub fn spoofed_identity(format: FormatSelection) -> &'static str {
    match format {
        FormatSelection::Clash => DEFAULT_IDENTITY,
        FormatSelection::SingBox => SINGBOX_IDENTITY,
        FormatSelection::Base64 => BASE64_IDENTITY,
        FormatSelection::Default => GENERIC_IDENTITY,
    }
}

/// Build the header set for the upstream request.
pub fn build_outbound_headers(
    caller: CallerClass,
    format: FormatSelection,
    identity: Option<&HeaderValue>,
    target: &TargetReference,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(origin) = same_origin(target) {
        headers.insert(REFERER, origin.clone());
        headers.insert(ORIGIN, origin);
    }

    let user_agent = match caller {
        CallerClass::BrowserViewer => HeaderValue::from_static(spoofed_identity(format)),
        CallerClass::ToolClient => identity
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_IDENTITY)),
    };
    headers.insert(USER_AGENT, user_agent);

    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

    headers
}

/// Serialized origin of the target, or `None` when it cannot be parsed.
fn same_origin(target: &TargetReference) -> Option<HeaderValue> {
    let url = Url::parse(target.resolved_url()).ok()?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return None;
    }
    HeaderValue::from_str(&origin.ascii_serialization()).ok()
}
