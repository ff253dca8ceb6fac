//! Query string handling.
//!
//! The proxy owns three parameters (`url`, `format`, `raw`). Everything else
//! belongs to the upstream resource and is re-appended verbatim when the
//! target comes from the path.

use url::form_urlencoded;

/// Parameter carrying the destination URL.
pub const URL_PARAM: &str = "url";
/// Parameter selecting the preview format.
pub const FORMAT_PARAM: &str = "format";
/// Parameter forcing pass-through delivery.
pub const RAW_PARAM: &str = "raw";

/// Control parameters of one request plus the leftover query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// First `url` value, decoded.
    pub url: Option<String>,
    /// First `format` value, decoded.
    pub format: Option<String>,
    /// First `raw` value was exactly `true`.
    pub raw: bool,
    forwarded: Option<String>,
}

impl QueryParams {
    /// Split a raw query string. Segments not owned by the proxy keep their
    /// original encoding and order.
    pub fn parse(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(query) = query else {
            return params;
        };

        let mut raw_seen = false;
        let mut kept = Vec::new();
        for segment in query.split('&').filter(|s| !s.is_empty()) {
            let Some((key, value)) = form_urlencoded::parse(segment.as_bytes()).next() else {
                continue;
            };
            match key.as_ref() {
                URL_PARAM => {
                    params.url.get_or_insert_with(|| value.into_owned());
                }
                FORMAT_PARAM => {
                    params.format.get_or_insert_with(|| value.into_owned());
                }
                RAW_PARAM => {
                    if !raw_seen {
                        raw_seen = true;
                        params.raw = value == "true";
                    }
                }
                _ => kept.push(segment),
            }
        }

        if !kept.is_empty() {
            params.forwarded = Some(kept.join("&"));
        }
        params
    }

    /// Query parameters that belong to the upstream resource, if any.
    pub fn forwarded(&self) -> Option<&str> {
        self.forwarded.as_deref()
    }
}
