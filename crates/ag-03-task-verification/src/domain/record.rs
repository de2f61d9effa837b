//! # Task Verification Record
//!
//! Per-task aggregate of accepted votes, stored under `verification:{taskId}`.
//! The task id is implied by the key and not repeated inside the record.

use super::errors::{AggregatorError, AggregatorResult};
use serde::{Deserialize, Serialize};
use shared_types::{OperatorAddress, Role, TaskId, TaskSubmission};
use std::collections::BTreeMap;

/// Votes collected for one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskVerificationRecord {
    /// The single performer submission, once received.
    pub performer: Option<TaskSubmission>,
    /// Attester submissions keyed by operator address.
    pub attesters: BTreeMap<OperatorAddress, TaskSubmission>,
}

impl TaskVerificationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a submission under its role.
    ///
    /// # Errors
    /// - `PerformerAlreadySubmitted` if the performer slot is taken
    /// - `AttesterAlreadySubmitted` if this address already attested
    pub fn insert(&mut self, task_id: TaskId, submission: TaskSubmission) -> AggregatorResult<()> {
        match submission.role {
            Role::Performer => {
                if self.performer.is_some() {
                    return Err(AggregatorError::PerformerAlreadySubmitted(task_id));
                }
                self.performer = Some(submission);
            }
            Role::Attester => {
                if self.attesters.contains_key(&submission.address) {
                    return Err(AggregatorError::AttesterAlreadySubmitted {
                        task_id,
                        address: submission.address,
                    });
                }
                self.attesters.insert(submission.address.clone(), submission);
            }
        }
        Ok(())
    }

    pub fn attester_count(&self) -> usize {
        self.attesters.len()
    }

    /// Attesters that approved the performer's candidate.
    pub fn positive_count(&self) -> usize {
        self.attesters.values().filter(|s| s.is_positive()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(address: &str, role: Role, result: &str) -> TaskSubmission {
        TaskSubmission {
            address: address.into(),
            result: result.into(),
            timestamp: 0,
            role,
        }
    }

    #[test]
    fn test_single_performer() {
        let mut record = TaskVerificationRecord::new();
        record
            .insert(1, submission("0xp", Role::Performer, "1-0xa"))
            .unwrap();

        assert_eq!(
            record.insert(1, submission("0xq", Role::Performer, "2-0xb")),
            Err(AggregatorError::PerformerAlreadySubmitted(1))
        );
        assert_eq!(record.performer.unwrap().address.as_str(), "0xp");
    }

    #[test]
    fn test_attester_once_per_address() {
        let mut record = TaskVerificationRecord::new();
        record
            .insert(1, submission("0xa", Role::Attester, "true"))
            .unwrap();

        assert_eq!(
            record.insert(1, submission("0xa", Role::Attester, "false")),
            Err(AggregatorError::AttesterAlreadySubmitted {
                task_id: 1,
                address: "0xa".into(),
            })
        );
        assert_eq!(record.attester_count(), 1);
        assert_eq!(record.positive_count(), 1);
    }

    #[test]
    fn test_record_json_layout() {
        let mut record = TaskVerificationRecord::new();
        record
            .insert(3, submission("0xa", Role::Attester, "true"))
            .unwrap();

        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert!(json["performer"].is_null());
        assert_eq!(json["attesters"]["0xa"]["result"], "true");

        let back: TaskVerificationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
