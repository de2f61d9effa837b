//! # Aggregator Telemetry
//!
//! Logging and metrics plumbing shared by the aggregator binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aggregator_telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AGG_SERVICE_NAME` | `task-aggregator` | Service name logged at startup |
//! | `AGG_LOG_LEVEL` | `info` | Filter directive (`RUST_LOG` takes precedence) |
//! | `AGG_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |

mod config;
mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use logging::init_logging;
pub use metrics::{encode_metrics, record_http_request, HTTP_REQUESTS};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to encode metrics: {0}")]
    MetricsEncode(String),
}

/// Install logging for the process.
///
/// Metrics need no initialization; counters register themselves on first use.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)
}

/// Span carrying the task id, for request handlers.
///
/// # Example
///
/// ```rust,ignore
/// let _span = aggregator_telemetry::task_span!("submit_vote", task_id = 42).entered();
/// ```
#[macro_export]
macro_rules! task_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
