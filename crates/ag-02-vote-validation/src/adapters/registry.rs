//! # Static Operator Registry
//!
//! Allow-list of operator addresses loaded once from configuration.
//! Addresses compare case-insensitively.

use crate::ports::outbound::{OperatorRegistry, RegistryError};
use async_trait::async_trait;
use shared_types::OperatorAddress;
use std::collections::HashSet;

/// Fixed set of registered operators.
#[derive(Debug, Clone, Default)]
pub struct StaticOperatorRegistry {
    operators: HashSet<String>,
}

impl StaticOperatorRegistry {
    pub fn new<I, S>(operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            operators: operators
                .into_iter()
                .map(|op| op.as_ref().trim().to_ascii_lowercase())
                .filter(|op| !op.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

#[async_trait]
impl OperatorRegistry for StaticOperatorRegistry {
    async fn is_registered(&self, identity: &OperatorAddress) -> Result<bool, RegistryError> {
        Ok(self
            .operators
            .contains(&identity.as_str().to_ascii_lowercase()))
    }
}
