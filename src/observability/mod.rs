//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline stages produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is a field on the request span
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
