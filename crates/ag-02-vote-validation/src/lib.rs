//! # Vote Validation (ag-02)
//!
//! Admission control for operator votes. A vote reaches the task record only
//! after passing every check below, in order; the first failure is returned.
//!
//! | # | Check | Error |
//! |---|-------|-------|
//! | 1 | Role is `performer` or `attester` | `InvalidRole` |
//! | 2 | `now - window ≤ timestamp ≤ now` | `StaleOrFutureTimestamp` |
//! | 3 | Identity derivable from the public key | `MalformedKey` |
//! | 4 | Result shape matches the role | `InvalidResultFormat` |
//! | 5 | Signature over `{domain}-{timestamp}-{taskId}-{result}` | `InvalidSignature` |
//! | 6 | Task not yet finished | `TaskAlreadyFinished` |
//! | 7 | Identity is a registered operator | `UnknownOperator` |
//!
//! Validation has no side effects.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure rules, no I/O
//! - **Ports Layer** (`ports/`): Collaborator traits (crypto, registry, clock)
//! - **Adapters** (`adapters/`): secp256k1 identity, static registry, clocks
//! - **Service Layer** (`service.rs`): Runs the checks against the ports

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::clock::{FixedTimeSource, SystemTimeSource};
pub use adapters::registry::StaticOperatorRegistry;
pub use adapters::secp256k1::{address_from_pubkey, keccak256, Secp256k1Identity};
pub use domain::entities::{ValidatedVote, ValidatorConfig, VoteRequest, DEFAULT_FRESHNESS_WINDOW_SECS};
pub use domain::errors::{ValidationError, ValidationResult};
pub use domain::rules::{canonical_message, check_freshness, check_result_format, parse_role};
pub use ports::inbound::VoteValidationApi;
pub use ports::outbound::{
    CryptoError, IdentityProvider, OperatorRegistry, RegistryError, SignatureVerifier, TimeSource,
};
pub use service::VoteValidator;
