//! Startup errors.
//!
//! Per-request failures never reach this type; they become responses in
//! `http::error`.

use std::net::AddrParseError;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid address: {0}")]
    Address(#[from] AddrParseError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] TryInitError),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
