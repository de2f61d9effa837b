//! # Aggregator Events
//!
//! Lifecycle events emitted by the vote path and the finalizer.
//! Observers (metrics, audit logging) subscribe; no component depends on an
//! event being delivered.

use serde::{Deserialize, Serialize};
use shared_types::{OperatorAddress, Role, TaskId};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregatorEvent {
    // =========================================================================
    // TASK VERIFICATION
    // =========================================================================
    /// A vote passed validation and was recorded.
    VoteAccepted {
        task_id: TaskId,
        operator: OperatorAddress,
        role: Role,
    },

    /// A task reached a local decision and was pushed to the finalization queue.
    TaskFinalized {
        task_id: TaskId,
        performer: OperatorAddress,
        result: i64,
    },

    // =========================================================================
    // FINALIZER
    // =========================================================================
    /// A forward was added to a task's tally.
    ForwardTallied {
        task_id: TaskId,
        result: i64,
        count: usize,
    },

    /// The settlement call succeeded.
    TaskSettled {
        task_id: TaskId,
        result: i64,
        operators: Vec<OperatorAddress>,
    },

    /// The settlement call failed; the tally was left intact.
    SettlementFailed {
        task_id: TaskId,
        result: i64,
        reason: String,
    },
}

impl AggregatorEvent {
    /// Topic the event is filed under.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::VoteAccepted { .. } => EventTopic::Votes,
            Self::TaskFinalized { .. } => EventTopic::Finalization,
            Self::ForwardTallied { .. }
            | Self::TaskSettled { .. }
            | Self::SettlementFailed { .. } => EventTopic::Settlement,
        }
    }

    /// Task the event refers to.
    #[must_use]
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::VoteAccepted { task_id, .. }
            | Self::TaskFinalized { task_id, .. }
            | Self::ForwardTallied { task_id, .. }
            | Self::TaskSettled { task_id, .. }
            | Self::SettlementFailed { task_id, .. } => *task_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Accepted votes.
    Votes,
    /// Local consensus decisions.
    Finalization,
    /// Fleet tally and settlement.
    Settlement,
}

impl EventTopic {
    pub const ALL: [EventTopic; 3] = [Self::Votes, Self::Finalization, Self::Settlement];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Votes => 0,
            Self::Finalization => 1,
            Self::Settlement => 2,
        }
    }
}

/// Which events a subscription receives.
///
/// Empty `topics` means every topic; `task_id` narrows to one task's
/// lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub topics: Vec<EventTopic>,
    pub task_id: Option<TaskId>,
}

impl EventFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            task_id: None,
        }
    }

    /// Every event of one task, from first vote to settlement.
    #[must_use]
    pub fn task(task_id: TaskId) -> Self {
        Self {
            topics: Vec::new(),
            task_id: Some(task_id),
        }
    }

    #[must_use]
    pub fn matches(&self, event: &AggregatorEvent) -> bool {
        let topic_match = self.topics.is_empty() || self.topics.contains(&event.topic());
        let task_match = self.task_id.map_or(true, |id| id == event.task_id());
        topic_match && task_match
    }
}
