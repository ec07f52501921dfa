//! Row-level lock manager.
//!
//! Many device sessions update the same rows concurrently (connection-status
//! flips, position inserts keyed by tracker id). SQLite gives us no
//! optimistic concurrency for the read-then-write pattern the sessions use,
//! so this manager serializes updates per logical row: at most one action
//! runs at a time for any `(entity kind, row id)` pair, across every session
//! in the process.
//!
//! The manager is an explicit service object — construct one, share it by
//! reference. Tests get isolated registries for free.
//!
//! # Acquisition
//!
//! ```text
//! with_lock(kind, id, timeout, action)
//!   │
//!   ├─ registry guard: look up or create the (kind, id) mutex   (atomic)
//!   ├─ acquire the mutex, bounded by `timeout`  ── timeout ──> LockTimeout
//!   ├─ run `action` while held
//!   └─ release; drop the registry entry once nobody waits on it
//! ```
//!
//! Entries exist only while held or contested, so the registry never grows
//! with the number of rows ever touched.

use crate::error::{StorageError, StorageResult};
use geotrack_core::constants::DEFAULT_LOCK_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

/// The record kinds that participate in row locking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Tracker,
    Position,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Tracker => write!(f, "tracker"),
            EntityKind::Position => write!(f, "position"),
        }
    }
}

/// Per-row mutual exclusion with bounded acquisition.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use geotrack_storage::{EntityKind, RowLockManager};
///
/// # async fn example() -> geotrack_storage::StorageResult<()> {
/// let locks = RowLockManager::new();
///
/// locks
///     .with_lock(EntityKind::Tracker, 42, Duration::from_secs(5), || async {
///         // read-then-write the tracker row here; no other session can
///         // enter this block for tracker 42 until it returns
///         Ok(())
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RowLockManager {
    /// Live lock entries; guarded for structural mutation only — the
    /// contended work itself runs without this guard held
    registry: Mutex<HashMap<(EntityKind, i64), Arc<AsyncMutex<()>>>>,
}

impl RowLockManager {
    /// Default budget for acquiring a row lock.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS);

    /// Create a manager with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` while holding the exclusive lock for `(kind, id)`.
    ///
    /// Acquisition waits at most `timeout`; on expiry the action is never
    /// started and `StorageError::LockTimeout` is returned. Different keys
    /// are fully independent and proceed in parallel.
    ///
    /// # Errors
    /// Returns `LockTimeout` when the lock cannot be acquired in time, or
    /// whatever error `action` itself produces.
    pub async fn with_lock<T, F, Fut>(
        &self,
        kind: EntityKind,
        id: i64,
        timeout: Duration,
        action: F,
    ) -> StorageResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = StorageResult<T>>,
    {
        let entry = self.entry(kind, id);

        let guard = tokio::time::timeout(timeout, Arc::clone(&entry).lock_owned())
            .await
            .map_err(|_| StorageError::LockTimeout {
                kind,
                id,
                timeout_ms: timeout.as_millis() as u64,
            })?;

        let result = action().await;

        drop(guard);
        self.release(kind, id, &entry);

        result
    }

    /// Look up or create the lock entry for a key. The registry guard makes
    /// the lookup-or-create atomic.
    fn entry(&self, kind: EntityKind, id: i64) -> Arc<AsyncMutex<()>> {
        let mut registry = self.registry.lock().expect("lock registry poisoned");
        Arc::clone(
            registry
                .entry((kind, id))
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }

    /// Drop the registry entry for a key once the holder is done with it.
    ///
    /// The entry stays when another task still references the same mutex
    /// (waiting in `lock_owned`), so a blocked waiter can never race a fresh
    /// mutex created for the same key.
    fn release(&self, kind: EntityKind, id: i64, entry: &Arc<AsyncMutex<()>>) {
        let mut registry = self.registry.lock().expect("lock registry poisoned");
        if let Some(current) = registry.get(&(kind, id))
            && Arc::ptr_eq(current, entry)
            && Arc::strong_count(current) == 2
        {
            // Only the registry and our caller hold the Arc: nobody waits
            registry.remove(&(kind, id));
        }
    }

    /// Number of live lock entries, for diagnostics and tests.
    #[must_use]
    pub fn live_entries(&self) -> usize {
        self.registry.lock().expect("lock registry poisoned").len()
    }
}
