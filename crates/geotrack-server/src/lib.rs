//! Connection lifecycle for the tracker server.
//!
//! ```text
//! Tracker 01 ┐
//!            │
//! Tracker 02 ├──> TrackerServer ──> TrackerSession (one task per device)
//!            │         │                  │
//! Tracker NN ┘         │                  ├──> TrackerCodec (framing)
//!                      │                  └──> Store (row-locked persistence)
//!                      └──> accept task
//! ```
//!
//! [`TrackerServer`] owns the listening socket and the live-session set;
//! each accepted connection becomes a [`TrackerSession`] running its own
//! read/dispatch loop. Both layers stop cooperatively: a stop signal is
//! observed at every blocking point, with a bounded wait-then-abort fallback
//! so shutdown latency stays within about ten seconds per task.

pub mod listener;
pub mod session;

pub use listener::{ServerConfig, ServerError, TrackerServer};
pub use session::{SessionError, SessionHandle, TrackerSession};
