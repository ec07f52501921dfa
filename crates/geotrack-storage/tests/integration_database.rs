//! Integration tests exercising the store against real SQLite databases.

use geotrack_core::{ConnectionStatus, DeviceId};
use geotrack_protocol::LocationReport;
use geotrack_storage::{Database, DatabaseConfig, Position, Store, Tracker};
use std::sync::Arc;

const FEEDBACK_BODY: &[u8] = b"240101A3600.0000N04500.0000E000.0120000090.0011110000L00000000";

fn device(seq: u8) -> DeviceId {
    DeviceId::new(&format!("3570158850{seq}")).unwrap()
}

#[tokio::test]
async fn test_file_backed_database_persists_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geotrack.db");
    let config = DatabaseConfig::new(path.to_str().unwrap());

    let tracker_id = {
        let db = Database::new(config.clone()).await.unwrap();
        let store = Store::new(&db);
        let id = store
            .register_tracker(&Tracker::auto_registered(&device(1)))
            .await
            .unwrap();
        db.close().await;
        id
    };

    // Reopen the same file: the row is still there
    let db = Database::new(config).await.unwrap();
    let store = Store::new(&db);
    let found = store.find_tracker_by_id(tracker_id).await.unwrap().unwrap();
    assert_eq!(found.device_id, "35701588501");
}

#[tokio::test]
async fn test_concurrent_updates_to_same_tracker_serialize() {
    let db = Database::in_memory().await.unwrap();
    let store = Arc::new(Store::new(&db));

    let mut tracker = Tracker::auto_registered(&device(2));
    tracker.id = store.register_tracker(&tracker).await.unwrap();

    // Many tasks flip the connection status of one row; the row lock keeps
    // every update whole, so all of them must succeed
    let mut tasks = Vec::new();
    for i in 0..8 {
        let store = Arc::clone(&store);
        let mut tracker = tracker.clone();
        tasks.push(tokio::spawn(async move {
            tracker.set_connection_status(if i % 2 == 0 {
                ConnectionStatus::Online
            } else {
                ConnectionStatus::Offline
            });
            store.update_tracker(&tracker).await
        }));
    }

    for task in tasks {
        task.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_concurrent_positions_all_recorded() {
    let db = Database::in_memory().await.unwrap();
    let store = Arc::new(Store::new(&db));

    let tracker_id = store
        .register_tracker(&Tracker::auto_registered(&device(3)))
        .await
        .unwrap();

    let report = LocationReport::parse(FEEDBACK_BODY).unwrap();
    let mut tasks = Vec::new();
    for _ in 0..10 {
        let store = Arc::clone(&store);
        let position = Position::from_report(tracker_id, &report);
        tasks.push(tokio::spawn(
            async move { store.record_position(&position).await },
        ));
    }

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let stored = store.positions_for_tracker(tracker_id).await.unwrap();
    assert_eq!(stored.len(), 10);
}

#[tokio::test]
async fn test_fix_time_round_trips_through_sqlite() {
    let db = Database::in_memory().await.unwrap();
    let store = Store::new(&db);

    let tracker_id = store
        .register_tracker(&Tracker::auto_registered(&device(4)))
        .await
        .unwrap();

    let report = LocationReport::parse(FEEDBACK_BODY).unwrap();
    store
        .record_position(&Position::from_report(tracker_id, &report))
        .await
        .unwrap();

    let stored = store.positions_for_tracker(tracker_id).await.unwrap();
    assert_eq!(stored[0].fix_time, report.timestamp);
    assert_eq!(stored[0].io_state, "11110000");
}
