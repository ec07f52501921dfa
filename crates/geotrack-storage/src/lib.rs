//! Persistence layer for the tracker server.
//!
//! SQLite-backed storage for tracker records and decoded GPS positions,
//! plus the row-lock manager that serializes concurrent updates coming from
//! many simultaneous device sessions.
//!
//! # Architecture
//!
//! - [`Database`] — connection pool wrapper with automatic migrations
//! - [`TrackerRepository`] / [`PositionRepository`] — data access traits with
//!   SQLite implementations
//! - [`RowLockManager`] — per-`(entity kind, row id)` mutual exclusion with
//!   timeout acquisition
//! - [`Store`] — the facade sessions talk to; every read-then-write update
//!   path goes through the lock manager before touching a row
//!
//! # Concurrency Contract
//!
//! SQLite provides no optimistic concurrency for our update pattern, so the
//! lock manager guarantees at most one in-flight update per row across all
//! sessions. Distinct rows (and distinct entity kinds) proceed in parallel.
//!
//! # Example
//!
//! ```no_run
//! use geotrack_storage::{Database, DatabaseConfig, Store};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("geotrack.db")).await?;
//! let store = Store::new(&db);
//!
//! if let Some(tracker) = store.find_tracker_by_device_id("35701588506").await? {
//!     println!("known tracker: {}", tracker.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod lock;
pub mod models;
pub mod repositories;
pub mod store;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use lock::{EntityKind, RowLockManager};
pub use models::{Position, Tracker};
pub use repositories::{
    PositionRepository, SqlitePositionRepository, SqliteTrackerRepository, TrackerRepository,
};
pub use store::Store;
