//! # secp256k1 Identity
//!
//! Key and signature handling for operator votes.
//!
//! - Public keys: hex SEC1 encoding, compressed or uncompressed, optional `0x`
//! - Signatures: hex 64-byte `r || s` ECDSA over SHA-256 of the message
//! - Identity: last 20 bytes of Keccak-256 of the uncompressed key (without
//!   the `0x04` prefix), rendered as lower-case `0x` hex

use crate::ports::outbound::{CryptoError, IdentityProvider, SignatureVerifier};
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature, VerifyingKey};
use sha2::Sha256;
use sha3::{Digest, Keccak256};
use shared_types::OperatorAddress;

/// Keccak-256 hash.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// Derive the operator address of a public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> OperatorAddress {
    let encoded = public_key.to_encoded_point(false);

    // Skip the 0x04 prefix.
    let hash = keccak256(&encoded.as_bytes()[1..]);

    OperatorAddress::new(format!("0x{}", hex::encode(&hash[12..])))
}

fn decode_hex(input: &str) -> Result<Vec<u8>, CryptoError> {
    let trimmed = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(trimmed).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))
}

fn parse_public_key(public_key: &str) -> Result<VerifyingKey, CryptoError> {
    let bytes = decode_hex(public_key)?;
    VerifyingKey::from_sec1_bytes(&bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// secp256k1 implementation of the crypto ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Identity;

impl Secp256k1Identity {
    pub fn new() -> Self {
        Self
    }
}

impl IdentityProvider for Secp256k1Identity {
    fn identity_of(&self, public_key: &str) -> Result<OperatorAddress, CryptoError> {
        Ok(address_from_pubkey(&parse_public_key(public_key)?))
    }
}

impl SignatureVerifier for Secp256k1Identity {
    fn verify(
        &self,
        public_key: &str,
        message: &[u8],
        signature: &str,
    ) -> Result<bool, CryptoError> {
        let key = parse_public_key(public_key)?;
        let sig_bytes = decode_hex(signature)?;
        let signature = Signature::from_slice(&sig_bytes)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        let digest = Sha256::digest(message);
        Ok(key.verify_prehash(&digest, &signature).is_ok())
    }
}
