//! # Local Consensus Evaluation
//!
//! Pure function over a `TaskVerificationRecord`. Re-run after every accepted
//! vote until it stops returning `Pending`; there is no maximum attester count.
//!
//! Percentages are rounded to the nearest integer, halves up, so two of three
//! attesters (66.67%) meet a 67% threshold. With `threshold_pct > 50` the
//! rounded positive and negative shares can never both reach the threshold.

use super::record::TaskVerificationRecord;
use serde::{Deserialize, Serialize};
use shared_types::{ConfigError, ACCEPTED_RESULT, REJECTED_RESULT};

/// Default minimum number of attester votes.
pub const DEFAULT_QUORUM: usize = 3;

/// Default agreement threshold, in percent.
pub const DEFAULT_THRESHOLD_PCT: u8 = 67;

/// Quorum and threshold for local decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusConfig {
    quorum: usize,
    threshold_pct: u8,
}

impl ConsensusConfig {
    /// # Errors
    /// `ConfigError::Invalid` unless `quorum ≥ 1` and `50 < threshold_pct ≤ 100`.
    pub fn new(quorum: usize, threshold_pct: u8) -> Result<Self, ConfigError> {
        if quorum == 0 {
            return Err(ConfigError::invalid("quorum", "must be at least 1"));
        }
        if threshold_pct <= 50 || threshold_pct > 100 {
            return Err(ConfigError::invalid(
                "threshold_pct",
                format!("{threshold_pct} is outside (50, 100]"),
            ));
        }
        Ok(Self {
            quorum,
            threshold_pct,
        })
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }

    pub fn threshold_pct(&self) -> u8 {
        self.threshold_pct
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            quorum: DEFAULT_QUORUM,
            threshold_pct: DEFAULT_THRESHOLD_PCT,
        }
    }
}

/// Local verdict on a task. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ConsensusOutcome {
    /// Not enough votes, or no side has reached the threshold yet.
    Pending,
    /// Attesters approved the performer's candidate.
    Approved { result: String },
    /// Attesters rejected the performer's candidate.
    Rejected,
}

impl ConsensusOutcome {
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Value submitted to the ledger for a decided task.
    pub fn settled_value(&self) -> Option<i64> {
        match self {
            Self::Pending => None,
            Self::Approved { .. } => Some(ACCEPTED_RESULT),
            Self::Rejected => Some(REJECTED_RESULT),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved { .. } => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// `100 * part / total`, rounded half up.
pub fn rounded_pct(part: usize, total: usize) -> u64 {
    if total == 0 {
        return 0;
    }
    let (part, total) = (part as u64, total as u64);
    (200 * part + total) / (2 * total)
}

/// Decide a task from its current record.
pub fn evaluate(record: &TaskVerificationRecord, config: &ConsensusConfig) -> ConsensusOutcome {
    let Some(performer) = &record.performer else {
        return ConsensusOutcome::Pending;
    };

    let total = record.attester_count();
    if total < config.quorum {
        return ConsensusOutcome::Pending;
    }

    let positive = record.positive_count();
    let threshold = u64::from(config.threshold_pct);

    if rounded_pct(positive, total) >= threshold {
        ConsensusOutcome::Approved {
            result: performer.result.clone(),
        }
    } else if rounded_pct(total - positive, total) >= threshold {
        ConsensusOutcome::Rejected
    } else {
        ConsensusOutcome::Pending
    }
}
