//! Prometheus exposition.
//!
//! Component crates register their counters in the default registry when
//! built with their `metrics` feature, so one `gather()` here exposes the
//! whole process. The HTTP surface counters are defined in this crate.
//!
//! All metrics follow the naming convention: `aggregator_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// HTTP requests served, by route and status code
    pub static ref HTTP_REQUESTS: IntCounterVec = register_int_counter_vec!(
        "aggregator_http_requests_total",
        "Total number of HTTP requests served",
        &["route", "status"]
    )
    .expect("metric creation failed");
}

/// Count one served request.
pub fn record_http_request(route: &str, status: u16) {
    HTTP_REQUESTS
        .with_label_values(&[route, &status.to_string()])
        .inc();
}

/// Encode every registered metric as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsEncode(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsEncode(e.to_string()))
}
