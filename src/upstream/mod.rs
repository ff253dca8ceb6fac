//! Outbound side of the proxy.
//!
//! # Data Flow
//! ```text
//! InboundRequest + TargetReference
//!     → headers.rs (Accept, spoofed or passed-through User-Agent, same-origin Referer/Origin)
//!     → forwarder.rs (GET with redirects, relaxed TLS, bounded timeouts)
//!     → ResponseMode::Stream | ResponseMode::Buffered
//!     → (ForwardError on any transport failure)
//! ```
//!
//! # Design Decisions
//! - One shared `reqwest::Client` for connection reuse
//! - Single attempt, no retries
//! - Certificate validation is off: targets are often self-signed

pub mod error;
pub mod forwarder;
pub mod headers;

pub use error::ForwardError;
pub use forwarder::{BufferedBody, ByteStream, Forwarder, ResponseMode, UpstreamResponse};
pub use headers::{build_outbound_headers, spoofed_identity, DEFAULT_IDENTITY};
