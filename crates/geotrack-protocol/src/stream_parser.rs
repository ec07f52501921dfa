//! Stream reassembly for sentinel-framed tracker messages.
//!
//! TCP is a stream protocol without message boundaries: a single read may
//! carry a partial frame, exactly one frame, several frames back to back, or
//! garbage between frames. This parser accumulates bytes and extracts raw
//! frame candidates using a two-state machine keyed on the `(` / `)`
//! sentinels:
//!
//! ```text
//! ┌──────────────┐  0x28 '('     ┌────────────────┐  0x29 ')'  ┌─────────────┐
//! │ WaitingStart │──────────────>│ ReadingPayload │───────────>│ frame queued│
//! └──────────────┘               └────────────────┘            └─────────────┘
//!        ^  │ other bytes               │ payload > max frame size
//!        │  │ (discarded)               │ (reset, oversize protection)
//!        │  └──────────────────────────-┘
//! ```
//!
//! Extracted candidates still include both sentinels; full validation
//! (size, device id, command table) happens in [`Frame::parse`].
//!
//! [`Frame::parse`]: crate::Frame::parse

use bytes::{Bytes, BytesMut};
use geotrack_core::constants::{FRAME_BEGIN, FRAME_END, FRAME_MAX_SIZE, READ_BUFFER_SIZE};
use std::collections::VecDeque;

/// Initial capacity for the payload under assembly.
const INITIAL_PAYLOAD_CAPACITY: usize = 256;

/// States of the frame-reassembly machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Scanning for the begin sentinel; everything else is discarded.
    WaitingStart,

    /// Accumulating payload bytes until the end sentinel.
    ReadingPayload,
}

/// Stateful reassembler turning a byte stream into raw frame candidates.
///
/// # Example
///
/// ```
/// use geotrack_protocol::StreamParser;
///
/// let mut parser = StreamParser::new();
///
/// // Data arrives split across reads
/// parser.feed(b"(035701588506");
/// assert!(parser.next_frame().is_none());
///
/// parser.feed(b"BP00)");
/// let raw = parser.next_frame().unwrap();
/// assert_eq!(&raw[..], b"(035701588506BP00)");
/// ```
#[derive(Debug)]
pub struct StreamParser {
    /// Bytes received but not yet consumed by the state machine
    buffer: BytesMut,

    /// Current machine state
    state: ParserState,

    /// Frame under assembly, begin sentinel included
    payload: Vec<u8>,

    /// Completed raw frames awaiting extraction
    frames: VecDeque<Bytes>,
}

impl StreamParser {
    /// Create a parser with the standard receive-buffer capacity.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(READ_BUFFER_SIZE),
            state: ParserState::WaitingStart,
            payload: Vec::with_capacity(INITIAL_PAYLOAD_CAPACITY),
            frames: VecDeque::new(),
        }
    }

    /// Feed bytes from the socket and run the state machine over them.
    ///
    /// Multiple complete frames in one feed are all queued.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
        self.drain_buffer();
    }

    /// Pop the next complete raw frame, sentinels included.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        self.frames.pop_front()
    }

    /// Current machine state, for diagnostics.
    #[must_use]
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Number of complete frames waiting for extraction.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    fn drain_buffer(&mut self) {
        for byte in self.buffer.split().freeze() {
            match self.state {
                ParserState::WaitingStart => {
                    if byte == FRAME_BEGIN {
                        self.payload.clear();
                        self.payload.push(byte);
                        self.state = ParserState::ReadingPayload;
                    }
                    // Garbage before the begin sentinel is dropped
                }
                ParserState::ReadingPayload => {
                    self.payload.push(byte);
                    if byte == FRAME_END {
                        self.frames
                            .push_back(Bytes::copy_from_slice(&self.payload));
                        self.payload.clear();
                        self.state = ParserState::WaitingStart;
                    } else if self.payload.len() > FRAME_MAX_SIZE {
                        // No end sentinel within the largest legal frame:
                        // drop the partial payload and resynchronize
                        self.payload.clear();
                        self.state = ParserState::WaitingStart;
                    }
                }
            }
        }
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}
