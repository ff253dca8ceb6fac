//! Structured logging.
//!
//! `RUST_LOG` overrides the configured level when set.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

use crate::config::{LogFormat, ObservabilityConfig};

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
    }
}

fn default_filter(config: &ObservabilityConfig) -> EnvFilter {
    let level = &config.log_level;
    EnvFilter::new(format!("sub_proxy={level},tower_http={level}"))
}
