//! # Atomic JSON Update
//!
//! Optimistic read-decode-modify-encode-CAS loop over a single key.
//!
//! ```text
//! get(key) ──→ decode ──→ f(current) ──→ encode ──→ CAS(key, old, new)
//!    ↑                        │                          │
//!    │                   Err(domain)               swapped? ──→ Ok(new)
//!    │                        ↓                          │
//!    │                  return unchanged                 │ conflict
//!    └───────────────────────────────────────────────────┘
//! ```
//!
//! The closure sees the freshest committed value on every attempt, so a
//! duplicate check inside it can never be bypassed by a concurrent writer.

use crate::domain::errors::StoreError;
use crate::ports::outbound::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{trace, warn};

/// Attempts before an update gives up with `StoreError::Contention`.
pub const MAX_CAS_RETRIES: usize = 16;

/// Atomically transform the JSON value stored at `key`.
///
/// `f` receives the current value (`None` if absent or expired) and returns
/// the value to store, or a domain error that aborts the update without
/// writing anything. `f` may run several times and must not have side effects.
///
/// The stored value's TTL is reset to `ttl` on every successful write.
pub async fn update_json<S, T, E, F>(
    store: &S,
    key: &str,
    ttl: Option<Duration>,
    mut f: F,
) -> Result<T, E>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + DeserializeOwned,
    E: From<StoreError>,
    F: FnMut(Option<T>) -> Result<T, E>,
{
    cas_loop(store, key, None, ttl, |current, _| f(current)).await
}

/// `update_json` that also tells `f` whether `guard` exists.
///
/// The guard is re-read on every attempt after the value, so a guard created
/// while an earlier attempt was in flight is seen by the retry.
pub async fn update_json_guarded<S, T, E, F>(
    store: &S,
    key: &str,
    guard: &str,
    ttl: Option<Duration>,
    f: F,
) -> Result<T, E>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + DeserializeOwned,
    E: From<StoreError>,
    F: FnMut(Option<T>, bool) -> Result<T, E>,
{
    cas_loop(store, key, Some(guard), ttl, f).await
}

async fn cas_loop<S, T, E, F>(
    store: &S,
    key: &str,
    guard: Option<&str>,
    ttl: Option<Duration>,
    mut f: F,
) -> Result<T, E>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + DeserializeOwned,
    E: From<StoreError>,
    F: FnMut(Option<T>, bool) -> Result<T, E>,
{
    for attempt in 1..=MAX_CAS_RETRIES {
        let raw = store.get(key).await?;

        let current = match raw.as_deref() {
            Some(bytes) => Some(serde_json::from_slice::<T>(bytes).map_err(|e| {
                StoreError::Serialization {
                    key: key.to_string(),
                    message: e.to_string(),
                }
            })?),
            None => None,
        };

        let guarded = match guard {
            Some(guard) => store.exists(guard).await?,
            None => false,
        };

        let next = f(current, guarded)?;

        let encoded = serde_json::to_vec(&next).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        if store
            .compare_and_swap(key, raw.as_deref(), encoded, ttl)
            .await?
        {
            return Ok(next);
        }

        trace!(key, attempt, "Concurrent write detected, retrying update");
        tokio::task::yield_now().await;
    }

    warn!(key, attempts = MAX_CAS_RETRIES, "Update abandoned under contention");
    Err(StoreError::Contention {
        key: key.to_string(),
        attempts: MAX_CAS_RETRIES,
    }
    .into())
}
