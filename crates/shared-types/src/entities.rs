//! # Core Domain Entities
//!
//! ## Lifecycle
//!
//! ```text
//! operator vote ──→ TaskSubmission ──→ TaskVerificationRecord (per task)
//!                                              │
//!                                   (quorum + threshold reached)
//!                                              ↓
//!                                       FinalizedResult ──→ finalization queue
//! ```

use crate::errors::EntityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a unit of work, as assigned by the ledger.
pub type TaskId = u64;

/// Settled value for a task whose candidate result was approved.
pub const ACCEPTED_RESULT: i64 = 1;

/// Settled value for a task whose candidate result was rejected.
pub const REJECTED_RESULT: i64 = 0;

/// Identity of an operator, derived from its public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorAddress(String);

impl OperatorAddress {
    /// Wrap an identity string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Borrow the identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperatorAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Role an operator plays for a given task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Produces the candidate result.
    Performer,
    /// Votes on whether the performer's candidate is correct.
    Attester,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Performer => "performer",
            Role::Attester => "attester",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "performer" => Ok(Role::Performer),
            "attester" => Ok(Role::Attester),
            other => Err(EntityError::UnknownRole(other.to_string())),
        }
    }
}

/// A single accepted vote. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSubmission {
    /// Identity of the submitting operator.
    pub address: OperatorAddress,
    /// Role-specific result (`blockNumber-blockHash` or `true`/`false`).
    pub result: String,
    /// Unix seconds at which the operator signed the vote.
    pub timestamp: i64,
    /// Role the vote was submitted under.
    pub role: Role,
}

impl TaskSubmission {
    /// Whether an attester vote approves the performer's candidate.
    pub fn is_positive(&self) -> bool {
        self.result == "true"
    }
}

/// Decided outcome handed to the settlement tier.
///
/// Produced at most once per task by the finalization gate and appended to
/// the finalization queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedResult {
    /// Task the result belongs to.
    pub task_id: TaskId,
    /// Address of the performer whose candidate was judged.
    pub operator: OperatorAddress,
    /// Settled value (`ACCEPTED_RESULT` or `REJECTED_RESULT`).
    pub result: i64,
    /// Aggregator instance that pushed the entry. Entries without one are
    /// counted once per forward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarder: Option<String>,
}

impl FinalizedResult {
    /// Encode for the finalization queue.
    pub fn encode(&self) -> Result<Vec<u8>, EntityError> {
        serde_json::to_vec(self).map_err(|e| EntityError::Malformed(e.to_string()))
    }

    /// Decode an entry popped from the finalization queue.
    pub fn decode(bytes: &[u8]) -> Result<Self, EntityError> {
        serde_json::from_slice(bytes).map_err(|e| EntityError::Malformed(e.to_string()))
    }
}

/// Current wall-clock time in unix seconds.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
