//! # Forward Tally
//!
//! Per-task count of forwards received from the aggregator fleet, grouped by
//! settled value. Stored under `tally:{taskId}` and updated atomically through
//! `update_json`, so concurrent finalizer instances never lose a forward.

use serde::{Deserialize, Serialize};
use shared_types::{FinalizedResult, OperatorAddress};
use std::collections::{BTreeMap, BTreeSet};

/// Separator the ledger expects between operator identities.
pub const OPERATOR_SEPARATOR: &str = "&";

/// Forwards received for one settled value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultTally {
    pub count: usize,
    /// Operator listed by each counted forward, in arrival order.
    pub operators: Vec<OperatorAddress>,
    /// Aggregator instances already counted.
    #[serde(default)]
    pub forwarders: BTreeSet<String>,
}

impl ResultTally {
    /// Operators in the ledger's `a&b&c` format.
    pub fn joined_operators(&self) -> String {
        self.operators
            .iter()
            .map(OperatorAddress::as_str)
            .collect::<Vec<_>>()
            .join(OPERATOR_SEPARATOR)
    }
}

/// All forwards for one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardTally {
    pub results: BTreeMap<i64, ResultTally>,
}

impl ForwardTally {
    /// Count `entry` under its result value.
    ///
    /// Returns `false` when the entry's forwarder was already counted for that
    /// value. Entries without a forwarder always count.
    pub fn record(&mut self, entry: &FinalizedResult) -> bool {
        let slot = self.results.entry(entry.result).or_default();
        if let Some(forwarder) = &entry.forwarder {
            if !slot.forwarders.insert(forwarder.clone()) {
                return false;
            }
        }
        slot.count += 1;
        slot.operators.push(entry.operator.clone());
        true
    }

    pub fn get(&self, result: i64) -> Option<&ResultTally> {
        self.results.get(&result)
    }

    pub fn count(&self, result: i64) -> usize {
        self.get(result).map_or(0, |slot| slot.count)
    }
}
