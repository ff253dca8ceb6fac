//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by delivery mode and status
//! - `proxy_request_duration_seconds` (histogram): end-to-end handler latency
//! - `proxy_upstream_failures_total` (counter): transport failures by kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one handled request.
pub fn record_request(mode: &'static str, status: u16, start_time: Instant) {
    counter!("proxy_requests_total", "mode" => mode, "status" => status.to_string())
        .increment(1);
    histogram!("proxy_request_duration_seconds", "mode" => mode)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record a failed upstream fetch.
pub fn record_upstream_failure(kind: &'static str) {
    counter!("proxy_upstream_failures_total", "kind" => kind).increment(1);
}
