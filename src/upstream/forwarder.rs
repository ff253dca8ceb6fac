//! Upstream fetch.
//!
//! # Responsibilities
//! - GET the resolved target with the outbound headers
//! - Follow redirects up to the configured bound
//! - Hand back a live stream (pass-through) or a fully decoded body (preview)
//! - Turn every transport failure into `ForwardError`
//!
//! # Design Decisions
//! - Content-coding is decoded by the client, so forwarded bodies are
//!   always identity-encoded
//! - Dropping the returned stream (client went away) drops the upstream
//!   connection
//! - Elapsed time stops at the response head when streaming and at the end
//!   of the body when buffering

use std::time::{Duration, Instant};

use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt};
use reqwest::redirect;

use crate::config::UpstreamConfig;
use crate::http::response::DeliveryMode;
use crate::routing::TargetReference;
use crate::upstream::error::ForwardError;

/// Body chunks straight from the upstream connection.
pub type ByteStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// Upstream status, headers and body, owned by whoever consumes it.
pub struct UpstreamResponse<B> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: B,
    pub elapsed: Duration,
}

/// A complete upstream body decoded as UTF-8 (lossy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedBody {
    pub text: String,
    /// Size of the body as received, before decoding.
    pub byte_len: usize,
}

/// The fetched resource in the shape its single writer expects.
pub enum ResponseMode {
    Stream(UpstreamResponse<ByteStream>),
    Buffered(UpstreamResponse<BufferedBody>),
}

impl ResponseMode {
    pub fn status(&self) -> StatusCode {
        match self {
            ResponseMode::Stream(r) => r.status,
            ResponseMode::Buffered(r) => r.status,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            ResponseMode::Stream(r) => r.elapsed,
            ResponseMode::Buffered(r) => r.elapsed,
        }
    }
}

/// Performs the single outbound request of each proxied call.
#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    /// Build the shared client. Certificate validation is disabled.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let redirects = if config.max_redirects == 0 {
            redirect::Policy::none()
        } else {
            redirect::Policy::limited(config.max_redirects)
        };

        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(redirects)
            .connect_timeout(Duration::from_secs(config.connect_secs))
            .timeout(Duration::from_secs(config.request_secs));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetch the target and shape the result for `delivery`.
    pub async fn fetch(
        &self,
        target: &TargetReference,
        headers: HeaderMap,
        delivery: DeliveryMode,
    ) -> Result<ResponseMode, ForwardError> {
        let started = Instant::now();
        let response = self
            .client
            .get(target.resolved_url())
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();

        if response.url().as_str() != target.resolved_url() {
            tracing::debug!(
                target_url = %target,
                final_url = %response.url(),
                "Followed redirect"
            );
        }

        match delivery {
            DeliveryMode::PassThrough => Ok(ResponseMode::Stream(UpstreamResponse {
                status,
                headers,
                body: response.bytes_stream().boxed(),
                elapsed: started.elapsed(),
            })),
            DeliveryMode::Preview => {
                let bytes = response.bytes().await?;
                Ok(ResponseMode::Buffered(UpstreamResponse {
                    status,
                    headers,
                    body: BufferedBody {
                        text: String::from_utf8_lossy(&bytes).into_owned(),
                        byte_len: bytes.len(),
                    },
                    elapsed: started.elapsed(),
                }))
            }
        }
    }
}
