//! # Error Types
//!
//! Errors for parsing the shared entities and for rejecting configuration.

use thiserror::Error;

/// Errors raised while decoding shared entities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityError {
    /// Role string is neither `performer` nor `attester`.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Payload could not be decoded.
    #[error("Malformed payload: {0}")]
    Malformed(String),
}

/// A configuration value that cannot be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    /// A setting is present but out of range or unparsable.
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
