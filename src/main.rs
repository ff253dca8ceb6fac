//! Subscription forwarding proxy.
//!
//! # Architecture Overview
//!
//! ```text
//! GET /api/...?url=...
//!     → routing   (target, caller class, format)
//!     → upstream  (outbound headers, single GET)
//!     → http      (pass-through | preview | 502)
//!     → client
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use sub_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use sub_proxy::lifecycle::{wait_for_signal, Shutdown};
use sub_proxy::observability::{logging, metrics};
use sub_proxy::{HttpServer, ProxyError};

#[derive(Parser)]
#[command(name = "sub-proxy")]
#[command(about = "Forwarding proxy for subscription links", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), ProxyError> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sub-proxy starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_timeout_secs = config.upstream.request_secs,
        max_redirects = config.upstream.max_redirects,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
