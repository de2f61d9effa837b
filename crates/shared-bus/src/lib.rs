//! # Shared Bus - In-Process Event Bus
//!
//! Carries lifecycle events from the vote path and the finalizer to local
//! observers (metrics, audit logging).
//!
//! ```text
//! ┌────────────────────┐                    ┌──────────────┐
//! │ Task Verification  │    publish()       │  Observers   │
//! │ Finalizer          │ ──────┐            │              │
//! └────────────────────┘       │            └──────────────┘
//!                              ▼                    ↑
//!                        ┌──────────────┐          │
//!                        │  Event Bus   │ ─────────┘
//!                        └──────────────┘  subscribe()
//! ```
//!
//! ## Rules
//!
//! - The bus is advisory. Correctness never depends on delivery; all
//!   coordination state lives in the store.
//! - Publishing with no subscribers is not an error.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{AggregatorEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
