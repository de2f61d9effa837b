//! # Adapters
//!
//! - `secp256k1` - Hex secp256k1 keys and signatures, Keccak-derived addresses
//! - `registry` - Allow-list operator registry
//! - `clock` - System and fixed time sources

pub mod clock;
pub mod registry;
pub mod secp256k1;
