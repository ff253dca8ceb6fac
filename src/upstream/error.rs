//! Transport failures while forwarding.

use std::error::Error as _;

use thiserror::Error;

/// Why the upstream fetch produced no usable response.
///
/// Messages are human readable and end up in the 502 body.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid target URL: {0}")]
    InvalidTarget(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("upstream timed out: {0}")]
    Timeout(String),

    #[error("redirect failed: {0}")]
    Redirect(String),

    #[error("failed to read upstream body: {0}")]
    Body(String),

    #[error("upstream request failed: {0}")]
    Request(String),
}

impl ForwardError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::InvalidTarget(_) => "invalid_target",
            ForwardError::Connect(_) => "connect",
            ForwardError::Timeout(_) => "timeout",
            ForwardError::Redirect(_) => "redirect",
            ForwardError::Body(_) => "body",
            ForwardError::Request(_) => "request",
        }
    }
}

impl From<reqwest::Error> for ForwardError {
    fn from(err: reqwest::Error) -> Self {
        let message = describe(&err);
        if err.is_builder() {
            ForwardError::InvalidTarget(message)
        } else if err.is_timeout() {
            ForwardError::Timeout(message)
        } else if err.is_connect() {
            ForwardError::Connect(message)
        } else if err.is_redirect() {
            ForwardError::Redirect(message)
        } else if err.is_body() || err.is_decode() {
            ForwardError::Body(message)
        } else {
            ForwardError::Request(message)
        }
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
