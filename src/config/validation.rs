//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check cross-field constraints between inbound and upstream timeouts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// Upper bound on `upstream.max_redirects`.
pub const MAX_REDIRECT_LIMIT: usize = 20;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field}: {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("timeouts.request_secs ({inbound}) must be greater than upstream.request_secs ({upstream})")]
    InboundTimeoutTooShort { inbound: u64, upstream: u64 },

    #[error("upstream.max_redirects ({0}) exceeds {max}", max = MAX_REDIRECT_LIMIT)]
    TooManyRedirects(usize),
}

/// Check every semantic rule and collect all failures.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    for (field, value) in [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("upstream.connect_secs", config.upstream.connect_secs),
        ("upstream.request_secs", config.upstream.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroValue { field });
        }
    }

    // The inbound layer starts first; on a tie it fires before the upstream
    // timeout and the caller sees 408 instead of the 502 diagnostic.
    if config.timeouts.request_secs <= config.upstream.request_secs {
        errors.push(ValidationError::InboundTimeoutTooShort {
            inbound: config.timeouts.request_secs,
            upstream: config.upstream.request_secs,
        });
    }

    if config.upstream.max_redirects > MAX_REDIRECT_LIMIT {
        errors.push(ValidationError::TooManyRedirects(
            config.upstream.max_redirects,
        ));
    }

    if config.preview.max_chars == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "preview.max_chars",
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
