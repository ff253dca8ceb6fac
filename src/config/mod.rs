//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed to HttpServer at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the proxy runs without a file
//! - Spoofed identities and classifier patterns are constants, not config

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, PreviewConfig, ProxyConfig, TimeoutConfig,
    UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
