//! HTTP settlement gateway.
//!
//! POSTs `{"taskId", "result", "operators"}` to the ledger client. The client
//! owns retries and transaction submission; any non-2xx answer is a failure.

use ag_04_finalizer::{SettlementError, SettlementGateway};
use async_trait::async_trait;
use serde::Serialize;
use shared_types::TaskId;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SettlementRequest<'a> {
    task_id: TaskId,
    result: i64,
    operators: &'a str,
}

/// `SettlementGateway` backed by an HTTP ledger client.
pub struct HttpSettlementGateway {
    client: reqwest::Client,
    url: String,
}

impl HttpSettlementGateway {
    /// # Errors
    /// `SettlementError::Transport` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SettlementError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SettlementError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SettlementGateway for HttpSettlementGateway {
    async fn submit(
        &self,
        task_id: TaskId,
        result: i64,
        operators: &str,
    ) -> Result<(), SettlementError> {
        let request = SettlementRequest {
            task_id,
            result,
            operators,
        };
        debug!(task_id, result, url = %self.url, "Submitting settlement");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SettlementError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(SettlementError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
