//! Store facade used by device sessions.
//!
//! Bundles the repositories with the row lock manager and enforces the
//! concurrency contract: every update path the protocol core uses is wrapped
//! in the matching row lock before it touches the database. Sessions never
//! talk to repositories or locks directly.

use crate::connection::Database;
use crate::error::StorageResult;
use crate::lock::{EntityKind, RowLockManager};
use crate::models::{Position, Tracker};
use crate::repositories::{
    PositionRepository, SqlitePositionRepository, SqliteTrackerRepository, TrackerRepository,
};
use std::time::Duration;
use tracing::debug;

/// Lock-aware persistence facade.
///
/// Cheap to share behind an `Arc`; all state lives in the pool and the lock
/// registry.
pub struct Store {
    trackers: SqliteTrackerRepository,
    positions: SqlitePositionRepository,
    locks: RowLockManager,
    lock_timeout: Duration,
}

impl Store {
    /// Create a store with the default lock acquisition budget.
    pub fn new(db: &Database) -> Self {
        Self::with_lock_timeout(db, RowLockManager::DEFAULT_TIMEOUT)
    }

    /// Create a store with a custom lock acquisition budget.
    pub fn with_lock_timeout(db: &Database, lock_timeout: Duration) -> Self {
        Self {
            trackers: SqliteTrackerRepository::new(db.pool().clone()),
            positions: SqlitePositionRepository::new(db.pool().clone()),
            locks: RowLockManager::new(),
            lock_timeout,
        }
    }

    /// Look up a tracker by the device id it transmits.
    pub async fn find_tracker_by_device_id(
        &self,
        device_id: &str,
    ) -> StorageResult<Option<Tracker>> {
        self.trackers.find_by_device_id(device_id).await
    }

    /// Look up a tracker by row id.
    pub async fn find_tracker_by_id(&self, id: i64) -> StorageResult<Option<Tracker>> {
        self.trackers.find_by_id(id).await
    }

    /// Register a new tracker record, returning the assigned row id.
    ///
    /// No lock is taken: the row does not exist yet, so nothing can contend
    /// on it.
    pub async fn register_tracker(&self, tracker: &Tracker) -> StorageResult<i64> {
        let id = self.trackers.create(tracker).await?;
        debug!(device_id = %tracker.device_id, id, "tracker registered");
        Ok(id)
    }

    /// Update a tracker row under its row lock.
    ///
    /// # Errors
    /// `NotFound` if the row disappeared, `LockTimeout` if another session
    /// held the row past the budget.
    pub async fn update_tracker(&self, tracker: &Tracker) -> StorageResult<()> {
        self.locks
            .with_lock(EntityKind::Tracker, tracker.id, self.lock_timeout, || async {
                self.trackers.update(tracker).await
            })
            .await
    }

    /// Delete a tracker row.
    pub async fn delete_tracker(&self, id: i64) -> StorageResult<()> {
        self.trackers.delete(id).await
    }

    /// Store a decoded position under the owning tracker's position lock.
    ///
    /// Keyed by tracker id so concurrent feedback frames for one unit
    /// serialize while different units proceed in parallel.
    pub async fn record_position(&self, position: &Position) -> StorageResult<i64> {
        self.locks
            .with_lock(
                EntityKind::Position,
                position.tracker_id,
                self.lock_timeout,
                || async { self.positions.create(position).await },
            )
            .await
    }

    /// All positions reported by one tracker, oldest first.
    pub async fn positions_for_tracker(&self, tracker_id: i64) -> StorageResult<Vec<Position>> {
        self.positions.find_by_tracker(tracker_id).await
    }

    /// Delete a position row.
    pub async fn delete_position(&self, id: i64) -> StorageResult<()> {
        self.positions.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use geotrack_core::{ConnectionStatus, DeviceId};
    use geotrack_protocol::LocationReport;

    async fn store() -> (Database, Store) {
        let db = Database::in_memory().await.unwrap();
        let store = Store::new(&db);
        (db, store)
    }

    fn device() -> DeviceId {
        DeviceId::new("35701588506").unwrap()
    }

    fn report() -> LocationReport {
        let body = b"240101A3600.0000N04500.0000E000.0120000090.0011110000L00000000";
        LocationReport::parse(body).unwrap()
    }

    #[tokio::test]
    async fn test_register_and_find_tracker() {
        let (_db, store) = store().await;

        let id = store
            .register_tracker(&Tracker::auto_registered(&device()))
            .await
            .unwrap();
        assert!(id > 0);

        let found = store
            .find_tracker_by_device_id("35701588506")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.name, "tracker#35701588506");

        assert!(
            store
                .find_tracker_by_device_id("00000000000")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_update_tracker_round_trip() {
        let (_db, store) = store().await;

        let mut tracker = Tracker::auto_registered(&device());
        tracker.id = store.register_tracker(&tracker).await.unwrap();

        tracker.set_connection_status(ConnectionStatus::Offline);
        store.update_tracker(&tracker).await.unwrap();

        let found = store.find_tracker_by_id(tracker.id).await.unwrap().unwrap();
        assert_eq!(
            found.get_connection_status().unwrap(),
            ConnectionStatus::Offline
        );
    }

    #[tokio::test]
    async fn test_update_missing_tracker_not_found() {
        let (_db, store) = store().await;

        let mut tracker = Tracker::auto_registered(&device());
        tracker.id = 999;

        assert!(matches!(
            store.update_tracker(&tracker).await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_record_and_read_positions() {
        let (_db, store) = store().await;

        let tracker_id = store
            .register_tracker(&Tracker::auto_registered(&device()))
            .await
            .unwrap();

        let position = Position::from_report(tracker_id, &report());
        let position_id = store.record_position(&position).await.unwrap();
        assert!(position_id > 0);

        let stored = store.positions_for_tracker(tracker_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].latitude, 36.0);
        assert_eq!(stored[0].longitude, 45.0);
        assert_eq!(stored[0].fix_time, report().timestamp);
    }

    #[tokio::test]
    async fn test_delete_tracker_and_position() {
        let (_db, store) = store().await;

        let tracker_id = store
            .register_tracker(&Tracker::auto_registered(&device()))
            .await
            .unwrap();
        let position_id = store
            .record_position(&Position::from_report(tracker_id, &report()))
            .await
            .unwrap();

        store.delete_position(position_id).await.unwrap();
        assert!(matches!(
            store.delete_position(position_id).await,
            Err(StorageError::NotFound { .. })
        ));

        store.delete_tracker(tracker_id).await.unwrap();
        assert!(
            store
                .find_tracker_by_id(tracker_id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
