//! Wire protocol for GPS tracker devices.
//!
//! Trackers connect over plain TCP and exchange sentinel-framed ASCII
//! messages. This crate implements the byte-level protocol stack:
//!
//! - [`BoundedBlock`] — size-checked immutable byte block, the base of every
//!   protocol structure
//! - [`Frame`] — a complete validated message between `(` and `)` sentinels
//! - [`Command`] / [`CommandCode`] — the 4-character operation code and its
//!   static descriptor table
//! - [`LocationReport`] — the fixed 62-byte GPS fix record carried by
//!   feedback (`BR00`) frames
//! - [`StreamParser`] / [`TrackerCodec`] — stream reassembly and the Tokio
//!   codec used with `Framed` TCP streams
//!
//! # Protocol Flow Example
//!
//! A tracker checks in and starts reporting:
//!
//! ```text
//! device: (035701588506BP00)                     handshake
//! server: (035701588506AP01HSO)                  handshake ack
//! device: (035701588506BP05...)                  login
//! server: (035701588506AP05)                     login ack
//! device: (035701588506BR00<62-byte fix>)        periodic feedback
//! ```

pub mod block;
pub mod codec;
pub mod command;
pub mod frame;
pub mod location;
pub mod stream_parser;

pub use block::BoundedBlock;
pub use codec::TrackerCodec;
pub use command::{Command, CommandCode, CommandDescriptor, HandlerKind};
pub use frame::Frame;
pub use location::LocationReport;
pub use stream_parser::{ParserState, StreamParser};
