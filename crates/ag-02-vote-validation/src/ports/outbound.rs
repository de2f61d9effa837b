//! # Outbound Ports (Driven Ports / SPI)
//!
//! External collaborators of the validator. None of them belong to the
//! aggregator: key formats, signature schemes and the operator registry are
//! owned elsewhere and reached through these traits.

use async_trait::async_trait;
use shared_types::OperatorAddress;
use thiserror::Error;

/// Error from cryptographic collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Bytes could not be decoded (bad hex, wrong length).
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Decoded bytes are not a valid key or signature.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}

/// Error from the operator registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry could not be queried.
    #[error("Registry unavailable: {0}")]
    Unavailable(String),
}

/// Verifies a signature over a message with a public key.
pub trait SignatureVerifier: Send + Sync {
    /// `Ok(false)` means well-formed but not matching.
    fn verify(&self, public_key: &str, message: &[u8], signature: &str)
        -> Result<bool, CryptoError>;
}

/// Derives an operator identity from a public key.
pub trait IdentityProvider: Send + Sync {
    fn identity_of(&self, public_key: &str) -> Result<OperatorAddress, CryptoError>;
}

/// Confirms an identity is a currently registered operator.
#[async_trait]
pub trait OperatorRegistry: Send + Sync {
    async fn is_registered(&self, identity: &OperatorAddress) -> Result<bool, RegistryError>;
}

/// Current wall-clock time (for testability).
pub trait TimeSource: Send + Sync {
    /// Unix seconds.
    fn now(&self) -> i64;
}
