//! Finalizer configuration.

use shared_types::ConfigError;
use std::time::Duration;

/// Default number of independent forwards required before settling.
pub const DEFAULT_FLEET_THRESHOLD: usize = 1;

/// Default bound on a single settlement call.
pub const DEFAULT_SETTLEMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra lifetime of the settlement claim beyond the call timeout.
pub const SETTLEMENT_CLAIM_MARGIN: Duration = Duration::from_secs(5);

/// Fleet threshold and settlement bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizerConfig {
    fleet_threshold: usize,
    settlement_timeout: Duration,
}

impl FinalizerConfig {
    /// # Errors
    /// `ConfigError::Invalid` if `fleet_threshold` is zero or the timeout is zero.
    pub fn new(fleet_threshold: usize, settlement_timeout: Duration) -> Result<Self, ConfigError> {
        if fleet_threshold == 0 {
            return Err(ConfigError::invalid("fleet_threshold", "must be at least 1"));
        }
        if settlement_timeout.is_zero() {
            return Err(ConfigError::invalid(
                "settlement_timeout",
                "must be greater than zero",
            ));
        }
        Ok(Self {
            fleet_threshold,
            settlement_timeout,
        })
    }

    pub fn fleet_threshold(&self) -> usize {
        self.fleet_threshold
    }

    pub fn settlement_timeout(&self) -> Duration {
        self.settlement_timeout
    }

    /// Lifetime of `settling:{taskId}`. Outlives the call so a slow settlement
    /// cannot be raced by a second finalizer.
    pub fn claim_ttl(&self) -> Duration {
        self.settlement_timeout + SETTLEMENT_CLAIM_MARGIN
    }
}

impl Default for FinalizerConfig {
    fn default() -> Self {
        Self {
            fleet_threshold: DEFAULT_FLEET_THRESHOLD,
            settlement_timeout: DEFAULT_SETTLEMENT_TIMEOUT,
        }
    }
}
