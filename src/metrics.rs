//! Prometheus metrics for the publish path.
//!
//! Exposed on a dedicated listener when `METRICS_PORT` is non-zero.
//!
//! # Available Metrics
//!
//! - `gateway_messages_published_total` - Publish attempts (labels: topic, status)
//! - `gateway_publish_duration_seconds` - Time from publish call to broker ack (label: topic)
//! - `gateway_body_read_failures_total` - Requests whose body could not be read

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const MESSAGES_PUBLISHED_TOTAL: &str = "gateway_messages_published_total";
    pub const PUBLISH_DURATION_SECONDS: &str = "gateway_publish_duration_seconds";
    pub const BODY_READ_FAILURES_TOTAL: &str = "gateway_body_read_failures_total";
}

/// Install the Prometheus exporter and describe all metrics.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::MESSAGES_PUBLISHED_TOTAL,
        "Total number of publish attempts by outcome"
    );
    describe_histogram!(
        names::PUBLISH_DURATION_SECONDS,
        "Time spent waiting for broker acknowledgment in seconds"
    );
    describe_counter!(
        names::BODY_READ_FAILURES_TOTAL,
        "Total number of requests whose body could not be read"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record the outcome and latency of one publish.
pub fn record_publish(topic: &str, success: bool, duration_secs: f64) {
    let status = if success { "success" } else { "failure" };
    counter!(names::MESSAGES_PUBLISHED_TOTAL, "topic" => topic.to_string(), "status" => status)
        .increment(1);
    histogram!(names::PUBLISH_DURATION_SECONDS, "topic" => topic.to_string())
        .record(duration_secs);
}

pub fn record_body_read_failure() {
    counter!(names::BODY_READ_FAILURES_TOTAL).increment(1);
}
