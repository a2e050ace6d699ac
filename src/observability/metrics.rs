//! Metrics collection and exposition.
//!
//! # Metrics
//! - `page_counter_requests_total` (counter): count requests by status, outcome
//! - `page_counter_request_duration_seconds` (histogram): end-to-end latency
//! - `page_counter_download_bytes` (histogram): size of downloaded documents
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished count request.
pub fn record_request(status: u16, outcome: &'static str, start_time: Instant) {
    counter!(
        "page_counter_requests_total",
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("page_counter_request_duration_seconds", "outcome" => outcome)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record the size of a downloaded document.
pub fn record_download(bytes: usize) {
    histogram!("page_counter_download_bytes").record(bytes as f64);
}
