//! Response routing.
//!
//! # Responsibilities
//! - Decide pass-through vs preview from the caller class and `raw=true`
//! - Pass-through: mirror upstream status and headers (minus framing
//!   headers), allow any origin, stream the body unmodified
//! - Preview: answer 200 with the presenter's HTML; the upstream status is
//!   data in the report
//!
//! # Design Decisions
//! - `content-encoding`, `content-length` and `transfer-encoding` are never
//!   copied: the body is re-framed and already decoded
//! - Each `ResponseMode` variant has exactly one writer

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING,
};
use axum::http::{HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use url::form_urlencoded;

use crate::render::{PreviewReport, Presenter};
use crate::routing::query::RAW_PARAM;
use crate::routing::{CallerClass, FormatSelection, TargetReference};
use crate::upstream::{spoofed_identity, BufferedBody, ByteStream, ResponseMode, UpstreamResponse};

/// Upstream headers that are never copied to the client.
pub static STRIPPED_RESPONSE_HEADERS: [HeaderName; 3] =
    [CONTENT_ENCODING, CONTENT_LENGTH, TRANSFER_ENCODING];

/// How the upstream resource reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Raw status, headers and bytes.
    PassThrough,
    /// Rendered inspection page.
    Preview,
}

impl DeliveryMode {
    /// Tools always get the raw resource; browsers only with `raw=true`.
    pub fn for_caller(caller: CallerClass, raw_override: bool) -> Self {
        match caller {
            CallerClass::ToolClient => DeliveryMode::PassThrough,
            CallerClass::BrowserViewer if raw_override => DeliveryMode::PassThrough,
            CallerClass::BrowserViewer => DeliveryMode::Preview,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMode::PassThrough => "pass_through",
            DeliveryMode::Preview => "preview",
        }
    }
}

/// Request facts the preview page needs besides the upstream response.
#[derive(Debug, Clone)]
pub struct PreviewContext<'a> {
    pub target: &'a TargetReference,
    pub caller: CallerClass,
    pub format: FormatSelection,
    pub raw_link: String,
}

/// Hand the fetched resource to its writer.
pub fn route_response(
    mode: ResponseMode,
    context: &PreviewContext<'_>,
    presenter: &dyn Presenter,
) -> Response {
    match mode {
        ResponseMode::Stream(upstream) => pass_through(upstream),
        ResponseMode::Buffered(upstream) => preview(upstream, context, presenter),
    }
}

/// Mirror the upstream response.
pub fn pass_through(upstream: UpstreamResponse<ByteStream>) -> Response {
    let mut response = Response::new(Body::from_stream(upstream.body));
    *response.status_mut() = upstream.status;

    let headers = response.headers_mut();
    for (name, value) in upstream.headers.iter() {
        if STRIPPED_RESPONSE_HEADERS.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    response
}

/// Render the inspection page. Always 200.
pub fn preview(
    upstream: UpstreamResponse<BufferedBody>,
    context: &PreviewContext<'_>,
    presenter: &dyn Presenter,
) -> Response {
    let BufferedBody { text, byte_len } = upstream.body;
    let report = PreviewReport {
        target: context.target.resolved_url().to_string(),
        upstream_status: upstream.status.as_u16(),
        blocked: PreviewReport::looks_blocked(upstream.status, &text),
        body: text,
        body_bytes: byte_len,
        elapsed_ms: u64::try_from(upstream.elapsed.as_millis()).unwrap_or(u64::MAX),
        caller: context.caller,
        format: context.format,
        presented_identity: spoofed_identity(context.format).to_string(),
        raw_link: context.raw_link.clone(),
    };

    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/html; charset=utf-8")],
        presenter.render_preview(&report),
    )
        .into_response()
}

/// Same request with `raw=true` appended.
///
/// Existing `raw` segments are dropped first, since only the first one
/// counts when the query is parsed.
pub fn raw_link(uri: &Uri) -> String {
    let raw = format!("{RAW_PARAM}=true");
    let mut segments: Vec<&str> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty() && !is_raw_segment(segment))
        .collect();
    segments.push(&raw);
    format!("{}?{}", uri.path(), segments.join("&"))
}

fn is_raw_segment(segment: &str) -> bool {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .is_some_and(|(key, _)| key == RAW_PARAM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HelpPage;
    use axum::http::HeaderMap;
    use bytes::Bytes;
    use futures_util::stream::{self, StreamExt};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingPresenter {
        reports: Mutex<Vec<PreviewReport>>,
    }

    impl Presenter for RecordingPresenter {
        fn render_help(&self, _page: &HelpPage) -> String {
            String::new()
        }

        fn render_preview(&self, report: &PreviewReport) -> String {
            self.reports.lock().unwrap().push(report.clone());
            format!("rendered {}", report.upstream_status)
        }
    }

    fn upstream_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("5"));
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/yaml"));
        headers.insert(
            "subscription-userinfo",
            HeaderValue::from_static("upload=1; download=2; total=3"),
        );
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers
    }

    fn streamed(status: StatusCode, body: &'static str) -> UpstreamResponse<ByteStream> {
        UpstreamResponse {
            status,
            headers: upstream_headers(),
            body: stream::iter(vec![Ok(Bytes::from_static(body.as_bytes()))]).boxed(),
            elapsed: Duration::from_millis(12),
        }
    }

    fn buffered(status: StatusCode, text: &str) -> UpstreamResponse<BufferedBody> {
        UpstreamResponse {
            status,
            headers: upstream_headers(),
            body: BufferedBody {
                text: text.to_string(),
                byte_len: text.len(),
            },
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_delivery_mode() {
        use CallerClass::*;
        assert_eq!(DeliveryMode::for_caller(ToolClient, false), DeliveryMode::PassThrough);
        assert_eq!(DeliveryMode::for_caller(ToolClient, true), DeliveryMode::PassThrough);
        assert_eq!(DeliveryMode::for_caller(BrowserViewer, false), DeliveryMode::Preview);
        assert_eq!(DeliveryMode::for_caller(BrowserViewer, true), DeliveryMode::PassThrough);
    }

    #[tokio::test]
    async fn test_pass_through_filters_framing_headers() {
        let response = pass_through(streamed(StatusCode::IM_A_TEAPOT, "hello"));

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        let headers = response.headers();
        for name in &STRIPPED_RESPONSE_HEADERS {
            assert!(headers.get(name).is_none(), "{name} leaked");
        }
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[CONTENT_TYPE], "text/yaml");
        assert_eq!(
            headers["subscription-userinfo"],
            "upload=1; download=2; total=3"
        );
        assert_eq!(headers.get_all("set-cookie").iter().count(), 2);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_preview_is_200_with_upstream_status_as_data() {
        let presenter = RecordingPresenter::default();
        let target = TargetReference::new("example.com/sub");
        let context = PreviewContext {
            target: &target,
            caller: CallerClass::BrowserViewer,
            format: FormatSelection::SingBox,
            raw_link: "/api?url=example.com/sub&raw=true".into(),
        };

        for status in [StatusCode::NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR] {
            let response = route_response(
                ResponseMode::Buffered(buffered(status, "<b>gone</b>")),
                &context,
                &presenter,
            );
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers()[CONTENT_TYPE],
                "text/html; charset=utf-8"
            );
            assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());

            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            assert_eq!(body, format!("rendered {}", status.as_u16()));
        }

        let reports = presenter.reports.lock().unwrap();
        assert_eq!(reports.len(), 2);
        let report = &reports[0];
        assert_eq!(report.target, "https://example.com/sub");
        assert_eq!(report.upstream_status, 404);
        assert_eq!(report.body, "<b>gone</b>");
        assert_eq!(report.body_bytes, 11);
        assert_eq!(report.elapsed_ms, 1500);
        assert_eq!(report.format, FormatSelection::SingBox);
        assert_eq!(report.presented_identity, "sing-box/1.10.0");
        assert!(!report.blocked);
        assert_eq!(reports[1].upstream_status, 500);
    }

    #[test]
    fn test_preview_flags_blocked_upstream() {
        let presenter = RecordingPresenter::default();
        let target = TargetReference::new("example.com/sub");
        let context = PreviewContext {
            target: &target,
            caller: CallerClass::BrowserViewer,
            format: FormatSelection::Clash,
            raw_link: String::new(),
        };

        let _ = preview(buffered(StatusCode::FORBIDDEN, "denied"), &context, &presenter);
        assert!(presenter.reports.lock().unwrap()[0].blocked);
    }

    #[test]
    fn test_raw_link() {
        let uri: Uri = "/api?url=example.com%2Fsub".parse().unwrap();
        assert_eq!(raw_link(&uri), "/api?url=example.com%2Fsub&raw=true");

        let uri: Uri = "/api/example.com/sub".parse().unwrap();
        assert_eq!(raw_link(&uri), "/api/example.com/sub?raw=true");
    }

    #[test]
    fn test_raw_link_replaces_existing_raw() {
        let uri: Uri = "/api?raw=false&url=a.com&format=base64&raw=1"
            .parse()
            .unwrap();
        let link = raw_link(&uri);
        assert_eq!(link, "/api?url=a.com&format=base64&raw=true");

        let reparsed: Uri = link.parse().unwrap();
        assert!(crate::routing::query::QueryParams::parse(reparsed.query()).raw);
    }
}
