//! # Admission Rules
//!
//! Pure checks 1, 2 and 4, and the canonical signed message.

use super::errors::{ValidationError, ValidationResult};
use shared_types::{Role, TaskId};

/// Message an operator signs for a vote.
///
/// Binds domain, timestamp, task and result so a signature cannot be replayed
/// across tasks or domains.
pub fn canonical_message(domain_hash: &str, timestamp: i64, task_id: TaskId, result: &str) -> String {
    format!("{domain_hash}-{timestamp}-{task_id}-{result}")
}

/// Check 1: the declared role is known.
pub fn parse_role(role: &str) -> ValidationResult<Role> {
    role.parse::<Role>()
        .map_err(|_| ValidationError::InvalidRole(role.to_string()))
}

/// Check 2: `now - window ≤ timestamp ≤ now`.
pub fn check_freshness(timestamp: i64, now: i64, window_secs: i64) -> ValidationResult<()> {
    let earliest = now.saturating_sub(window_secs);
    if timestamp < earliest || timestamp > now {
        return Err(ValidationError::StaleOrFutureTimestamp {
            timestamp,
            earliest,
            now,
        });
    }
    Ok(())
}

/// Check 4: the result has the shape its role requires.
///
/// Performers submit `blockNumber-blockHash` (exactly two non-empty parts);
/// attesters submit `true` or `false`.
pub fn check_result_format(role: Role, result: &str) -> ValidationResult<()> {
    let valid = match role {
        Role::Performer => {
            let parts: Vec<&str> = result.split('-').collect();
            parts.len() == 2 && parts.iter().all(|p| !p.is_empty())
        }
        Role::Attester => result == "true" || result == "false",
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidResultFormat {
            role,
            result: result.to_string(),
        })
    }
}
