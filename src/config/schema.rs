//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the subscription proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Outbound client settings.
    pub upstream: UpstreamConfig,

    /// Preview page settings.
    pub preview: PreviewConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Inbound request timeouts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to produce a response head for an inbound request, in seconds.
    /// Must be longer than `upstream.request_secs`.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Outbound (upstream) client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total upstream request timeout in seconds (head and body).
    pub request_secs: u64,

    /// Maximum number of redirects followed before giving up.
    /// Zero hands 3xx responses back unfollowed.
    pub max_redirects: usize,

    /// Route upstream requests through `HTTP(S)_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 30,
            max_redirects: 10,
            use_system_proxy: false,
        }
    }
}

/// Preview page configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Number of body characters embedded in the preview page.
    pub max_chars: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { max_chars: 3000 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
