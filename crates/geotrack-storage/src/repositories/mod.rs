//! Repository traits and SQLite implementations.
//!
//! All data access goes through these traits so the protocol core never
//! depends on SQL directly and tests can run against in-memory databases.

pub mod position;
pub mod tracker;

pub use position::{PositionRepository, SqlitePositionRepository};
pub use tracker::{SqliteTrackerRepository, TrackerRepository};
