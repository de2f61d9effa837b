//! # Ports Layer
//!
//! - `inbound` - The validation API offered to the vote path
//! - `outbound` - Collaborators the validator depends on

pub mod inbound;
pub mod outbound;
