//! # Persisted Key Layout
//!
//! | Key | Value | TTL |
//! |-----|-------|-----|
//! | `verification:{taskId}` | TaskVerificationRecord | 24h |
//! | `finished:{taskId}` | vote-acceptance marker | 24h |
//! | `tally:{taskId}` | ForwardTally | 24h, deleted on settlement |
//! | `settling:{taskId}` | settlement claim | settlement timeout |
//! | `settled:{taskId}` | settlement marker | 24h |
//! | `task_queue` | FIFO of FinalizedResult | none |
//!
//! `finished:` and `settled:` are separate checkpoints: the first closes vote
//! acceptance, the second closes settlement.

use crate::entities::TaskId;
use std::time::Duration;

/// Lifetime of every per-task key.
pub const TASK_STATE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Name of the finalization queue.
pub const FINALIZATION_QUEUE: &str = "task_queue";

/// Key of a task's verification record.
pub fn verification_key(task_id: TaskId) -> String {
    format!("verification:{task_id}")
}

/// Key of a task's vote-acceptance marker.
pub fn finished_key(task_id: TaskId) -> String {
    format!("finished:{task_id}")
}

/// Key of a task's forward tally.
pub fn tally_key(task_id: TaskId) -> String {
    format!("tally:{task_id}")
}

/// Key of the in-flight settlement claim.
pub fn settling_key(task_id: TaskId) -> String {
    format!("settling:{task_id}")
}

/// Key of a task's settlement marker.
pub fn settled_key(task_id: TaskId) -> String {
    format!("settled:{task_id}")
}
