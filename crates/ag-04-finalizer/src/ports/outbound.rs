//! # Outbound Ports (Driven Ports)

use crate::error::SettlementError;
use async_trait::async_trait;
use shared_types::TaskId;

/// External ledger client that writes a settled result on chain.
///
/// The client owns retries and confirmation; one `submit` call is one
/// attempt from the finalizer's point of view.
#[async_trait]
pub trait SettlementGateway: Send + Sync {
    /// Submit the settled value for a task.
    ///
    /// `operators` is the contributing identities joined with `&`.
    async fn submit(
        &self,
        task_id: TaskId,
        result: i64,
        operators: &str,
    ) -> Result<(), SettlementError>;
}
