//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, proxy handler)
//!     → request.rs (request ID)
//!     → [routing interprets the request, upstream fetches the target]
//!     → response.rs (pass-through or preview)
//!     → error.rs (502 on transport failure)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, UuidRequestId, X_REQUEST_ID};
pub use response::{route_response, DeliveryMode, PreviewContext};
pub use server::HttpServer;
