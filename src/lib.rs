//! Subscription forwarding proxy.
//!
//! Fetches a remote subscription on behalf of the caller. Subscription
//! clients get the raw resource; browsers get an inspection page, with the
//! upstream request disguised as a subscription client.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
