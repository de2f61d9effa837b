//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{ValidatedVote, VoteRequest};
use crate::domain::errors::ValidationResult;
use async_trait::async_trait;

/// Vote admission API.
///
/// Implementations must be thread-safe (`Send + Sync`) and side-effect free.
#[async_trait]
pub trait VoteValidationApi: Send + Sync {
    /// Run every admission check against `request`, in order.
    ///
    /// # Errors
    /// The first failing check's error.
    async fn validate(&self, request: &VoteRequest) -> ValidationResult<ValidatedVote>;
}
