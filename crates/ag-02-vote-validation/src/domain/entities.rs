//! # Vote Entities

use serde::{Deserialize, Serialize};
use shared_types::{TaskId, TaskSubmission};

/// Default freshness window, in seconds.
pub const DEFAULT_FRESHNESS_WINDOW_SECS: i64 = 120;

/// A vote as submitted by an operator.
///
/// `role` stays a plain string so an unknown role survives deserialization
/// and is rejected by the validator with a precise error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(alias = "taskID")]
    pub task_id: TaskId,
    pub result: String,
    pub timestamp: i64,
    pub signature: String,
    #[serde(alias = "publicKey")]
    pub pub_key: String,
    pub role: String,
}

/// A vote that passed every admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedVote {
    pub task_id: TaskId,
    pub submission: TaskSubmission,
}

/// Validator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Domain hash bound into every signed message.
    pub domain_hash: String,
    /// Maximum age of a vote, in seconds.
    pub freshness_window_secs: i64,
}

impl ValidatorConfig {
    pub fn new(domain_hash: impl Into<String>) -> Self {
        Self {
            domain_hash: domain_hash.into(),
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
        }
    }

    pub fn with_freshness_window(mut self, secs: i64) -> Self {
        self.freshness_window_secs = secs;
        self
    }
}
