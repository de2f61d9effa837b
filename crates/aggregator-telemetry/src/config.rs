//! Telemetry configuration.

/// Service name attached to the startup line when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "task-aggregator";

const DEFAULT_LOG_LEVEL: &str = "info";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub service_name: String,

    /// Filter directive (`info`, `ag_04_finalizer=debug`, ...)
    pub log_level: String,

    /// One JSON object per line instead of terminal output
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Read `AGG_SERVICE_NAME`, `AGG_LOG_LEVEL` (falling back to `RUST_LOG`)
    /// and `AGG_JSON_LOGS`. JSON defaults on inside Kubernetes or Docker.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let containerized = lookup("KUBERNETES_SERVICE_HOST").is_some()
            || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("AGG_SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            log_level: lookup("AGG_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            json_logs: lookup("AGG_JSON_LOGS").map_or(containerized, |v| is_truthy(&v)),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "on")
}
