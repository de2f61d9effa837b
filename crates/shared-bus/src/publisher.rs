//! # Event Publisher
//!
//! Producers hold an `Arc<dyn EventPublisher>`; only the runtime and tests
//! see the concrete bus, because only they subscribe.

use crate::events::{AggregatorEvent, EventFilter, EventTopic};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use shared_types::TaskId;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Publishing side of the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event; returns how many subscribers it reached.
    ///
    /// Zero subscribers is normal and never an error.
    async fn publish(&self, event: AggregatorEvent) -> usize;

    /// Total events published since start.
    fn events_published(&self) -> u64;
}

/// Process-local bus over `tokio::sync::broadcast`.
///
/// Cross-instance coordination goes through the store, never through here.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<AggregatorEvent>,
    /// Published count per topic, indexed by `EventTopic::index`.
    published: [AtomicU64; 3],
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// A subscriber further behind than `capacity` events starts skipping.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: Default::default(),
            capacity,
        }
    }

    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, task_id = ?filter.task_id, "New subscription");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Follow a single task until it settles.
    #[must_use]
    pub fn subscribe_task(&self, task_id: TaskId) -> Subscription {
        self.subscribe(EventFilter::task(task_id))
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Events published under `topic`.
    #[must_use]
    pub fn published(&self, topic: EventTopic) -> u64 {
        self.published[topic.index()].load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: AggregatorEvent) -> usize {
        let topic = event.topic();
        let task_id = event.task_id();
        self.published[topic.index()].fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(?topic, task_id, receivers, "Event published");
                receivers
            }
            Err(_) => 0,
        }
    }

    fn events_published(&self) -> u64 {
        EventTopic::ALL.iter().map(|topic| self.published(*topic)).sum()
    }
}
