//! Persistent value records.
//!
//! Plain immutable rows passed into explicit `create`/`update` calls —
//! there is no ambient unit-of-work object re-attaching mutable entities.

pub mod position;
pub mod tracker;

pub use position::Position;
pub use tracker::Tracker;
