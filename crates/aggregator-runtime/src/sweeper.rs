//! Periodic removal of expired store keys.
//!
//! Task keys carry a 24 h TTL but most are never read again once the task
//! settles, so they are only reclaimed here.

use ag_01_store::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Purge expired keys every `every` until `shutdown` flips or its sender drops.
pub async fn run_store_sweeper(
    store: Arc<dyn KeyValueStore>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; nothing has expired yet.
    ticker.tick().await;

    while !*shutdown.borrow() {
        tokio::select! {
            _ = ticker.tick() => match store.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "Expired keys purged"),
                Err(e) => warn!(error = %e, "Expired key purge failed"),
            },
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
