//! Target resolution.
//!
//! # Responsibilities
//! - Pick the destination from `?url=` or from the path after `/api/`
//! - Re-append the upstream's own query parameters in path mode
//! - Guarantee an explicit scheme, defaulting to `https://`
//!
//! # Design Decisions
//! - No validation: malformed URLs fail at fetch time
//! - Scheme detection is a case-sensitive prefix check

use std::fmt;

use crate::routing::query::QueryParams;

/// Fixed route prefix in front of path-style targets.
pub const ROUTE_PREFIX: &str = "/api";

/// Path remainders that mean "no target".
const INDEX_MARKERS: [&str; 3] = ["index", "proxy", "favicon.ico"];

/// Function names that may sit between the prefix and a path-style target
/// (`/api/proxy/https://...`).
const LEGACY_SEGMENTS: [&str; 2] = ["proxy/", "index/"];

/// Scheme of a resolved target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// The destination resource fetched on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReference {
    raw_input: String,
    resolved_url: String,
    scheme: Scheme,
}

impl TargetReference {
    /// Normalize caller input, prepending `https://` when no scheme is given.
    pub fn new(raw_input: impl Into<String>) -> Self {
        let raw_input = raw_input.into();
        let (resolved_url, scheme) = if raw_input.starts_with("https://") {
            (raw_input.clone(), Scheme::Https)
        } else if raw_input.starts_with("http://") {
            (raw_input.clone(), Scheme::Http)
        } else {
            (format!("https://{raw_input}"), Scheme::Https)
        };

        Self {
            raw_input,
            resolved_url,
            scheme,
        }
    }

    /// Input as received from the caller.
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// URL the forwarder fetches. Always carries a scheme.
    pub fn resolved_url(&self) -> &str {
        &self.resolved_url
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }
}

impl fmt::Display for TargetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolved_url)
    }
}

/// Resolve the destination of a request, or `None` for the help page.
pub fn resolve_target(path: &str, query: &QueryParams) -> Option<TargetReference> {
    if let Some(url) = query.url.as_deref().filter(|u| !u.is_empty()) {
        return Some(TargetReference::new(url));
    }

    let remainder = path_remainder(path)?;
    let raw_input = match query.forwarded() {
        Some(forwarded) => format!("{remainder}?{forwarded}"),
        None => remainder.to_string(),
    };
    Some(TargetReference::new(raw_input))
}

fn path_remainder(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(ROUTE_PREFIX)?.strip_prefix('/')?;
    let rest = LEGACY_SEGMENTS
        .iter()
        .find_map(|segment| rest.strip_prefix(*segment))
        .unwrap_or(rest)
        .trim_start_matches('/');

    if rest.is_empty() || INDEX_MARKERS.contains(&rest) {
        None
    } else {
        Some(rest)
    }
}
