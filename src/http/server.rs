//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Run the request pipeline: resolve → classify → build headers →
//!   forward → route
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::{raw_link, route_response, DeliveryMode, PreviewContext};
use crate::lifecycle::ShutdownListener;
use crate::observability::metrics;
use crate::render::{HelpPage, HtmlPresenter, Presenter};
use crate::routing::{InboundRequest, ROUTE_PREFIX};
use crate::upstream::{build_outbound_headers, Forwarder};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
    pub presenter: Arc<dyn Presenter>,
}

/// HTTP server for the subscription proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server with the built-in HTML presenter.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let presenter = Arc::new(HtmlPresenter::new(config.preview.max_chars));
        Self::with_presenter(config, presenter)
    }

    /// Create a server that renders pages with `presenter`.
    pub fn with_presenter(
        config: ProxyConfig,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self, ProxyError> {
        let forwarder = Forwarder::new(&config.upstream).map_err(ProxyError::Client)?;
        let state = AppState {
            forwarder,
            presenter,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(proxy_handler))
            .route("/{*path}", get(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id(request.headers()),
                    )
                }),
            )
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.triggered().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers).to_string();
    let inbound = InboundRequest::from_parts(&uri, &headers);

    let Some(target) = inbound.target.as_ref() else {
        tracing::debug!(request_id = %request_id, path = %uri.path(), "No target, serving help page");
        metrics::record_request("help", StatusCode::OK.as_u16(), start_time);
        let page = HelpPage {
            action: ROUTE_PREFIX.to_string(),
        };
        return (
            StatusCode::OK,
            [(CONTENT_TYPE, "text/html; charset=utf-8")],
            state.presenter.render_help(&page),
        )
            .into_response();
    };

    let delivery = DeliveryMode::for_caller(inbound.caller, inbound.raw_override);
    tracing::info!(
        request_id = %request_id,
        target_url = %target,
        caller = %inbound.caller,
        format = %inbound.format,
        mode = delivery.as_str(),
        "Forwarding request"
    );

    let outbound = build_outbound_headers(
        inbound.caller,
        inbound.format,
        inbound.identity.as_ref(),
        target,
    );

    let response = match state.forwarder.fetch(target, outbound, delivery).await {
        Ok(mode) => {
            tracing::debug!(
                request_id = %request_id,
                upstream_status = mode.status().as_u16(),
                elapsed_ms = mode.elapsed().as_millis() as u64,
                "Upstream responded"
            );
            let context = PreviewContext {
                target,
                caller: inbound.caller,
                format: inbound.format,
                raw_link: raw_link(&uri),
            };
            route_response(mode, &context, state.presenter.as_ref())
        }
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                target_url = %target,
                kind = e.kind(),
                error = %e,
                "Upstream fetch failed"
            );
            e.into_response()
        }
    };

    metrics::record_request(delivery.as_str(), response.status().as_u16(), start_time);
    response
}
