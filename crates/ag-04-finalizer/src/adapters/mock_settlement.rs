//! In-memory settlement gateway for tests.

use crate::error::SettlementError;
use crate::ports::outbound::SettlementGateway;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::TaskId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// One recorded `submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementCall {
    pub task_id: TaskId,
    pub result: i64,
    pub operators: String,
}

/// Records every call; can be switched to fail or to stall.
#[derive(Default)]
pub struct MockSettlementGateway {
    calls: RwLock<Vec<SettlementCall>>,
    failing: AtomicBool,
    delay: RwLock<Option<Duration>>,
}

impl MockSettlementGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose calls are rejected until `set_failing(false)`.
    pub fn failing() -> Self {
        let gateway = Self::default();
        gateway.set_failing(true);
        gateway
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.write() = Some(delay);
        self
    }

    /// Calls that returned success or failure, in order.
    pub fn calls(&self) -> Vec<SettlementCall> {
        self.calls.read().clone()
    }
}

#[async_trait]
impl SettlementGateway for MockSettlementGateway {
    async fn submit(
        &self,
        task_id: TaskId,
        result: i64,
        operators: &str,
    ) -> Result<(), SettlementError> {
        let delay = *self.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.calls.write().push(SettlementCall {
            task_id,
            result,
            operators: operators.to_string(),
        });

        if self.failing.load(Ordering::SeqCst) {
            return Err(SettlementError::Rejected {
                status: 503,
                body: "ledger client unavailable".into(),
            });
        }
        Ok(())
    }
}
