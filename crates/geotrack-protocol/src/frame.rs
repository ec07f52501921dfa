//! Tracker frame: the complete wire message.
//!
//! # Wire Format
//!
//! ```text
//! offset  len  field
//! 0       1    begin sentinel 0x28 '('
//! 1       1    reserved byte (builder writes '0')
//! 2       11   device id, ASCII digits
//! 13      4    command code
//! 17      N    message body (N = total length - 18)
//! last    1    end sentinel 0x29 ')'
//! ```
//!
//! Total length is bounded to `[18, 1042]` bytes. Both sentinels, the
//! device-id digits, and the command code are validated at construction; a
//! `Frame` value in hand is always well-formed.

use crate::block::BoundedBlock;
use crate::command::{Command, CommandCode};
use bytes::{BufMut, BytesMut};
use geotrack_core::{DeviceId, Error, Result, constants::*};
use std::borrow::Cow;
use std::fmt;

/// A validated tracker protocol frame.
///
/// # Example
///
/// ```
/// use geotrack_core::DeviceId;
/// use geotrack_protocol::{CommandCode, Frame};
///
/// let device_id = DeviceId::new("35701588506").unwrap();
/// let frame = Frame::build(&device_id, CommandCode::HandshakeAck, "HSO").unwrap();
///
/// // Round trip through the raw wire bytes
/// let parsed = Frame::parse(&frame.contents()).unwrap();
/// assert_eq!(parsed, frame);
/// assert_eq!(parsed.body_str(), "HSO");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw frame bytes, sentinels included
    block: BoundedBlock,

    /// Device id decoded from offset 2
    device_id: DeviceId,

    /// Command code resolved from offset 13
    command: CommandCode,
}

impl Frame {
    /// Parse and validate a complete frame from raw inbound bytes.
    ///
    /// # Errors
    /// - `Error::SizeViolation` — length outside `[18, 1042]`
    /// - `Error::SentinelMismatch` — first byte is not `(` or last is not `)`
    /// - `Error::MalformedFrame` — the device id or embedded command failed
    ///   validation; wraps the underlying error with the raw frame rendered
    ///   for logging
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let block = BoundedBlock::new(raw.to_vec(), FRAME_MIN_SIZE, FRAME_MAX_SIZE)?;

        let first = raw[0];
        if first != FRAME_BEGIN {
            return Err(Error::SentinelMismatch {
                position: "begin",
                expected: FRAME_BEGIN,
                actual: first,
            });
        }
        let last = raw[raw.len() - 1];
        if last != FRAME_END {
            return Err(Error::SentinelMismatch {
                position: "end",
                expected: FRAME_END,
                actual: last,
            });
        }

        let id_bytes = &raw[DEVICE_ID_OFFSET..DEVICE_ID_OFFSET + DEVICE_ID_LENGTH];
        let device_id = DeviceId::new(&String::from_utf8_lossy(id_bytes))
            .map_err(|e| e.in_frame(raw))?;

        let command = Command::parse(&raw[COMMAND_OFFSET..COMMAND_OFFSET + COMMAND_LENGTH])
            .map_err(|e| e.in_frame(raw))?
            .code();

        Ok(Self {
            block,
            device_id,
            command,
        })
    }

    /// Build an outbound frame from its parts and re-validate it.
    ///
    /// The builder assembling an invalid frame is a caller contract
    /// violation; the validation error is surfaced rather than panicking.
    pub fn build(device_id: &DeviceId, command: CommandCode, body: &str) -> Result<Self> {
        let mut buf = BytesMut::with_capacity(FRAME_MIN_SIZE + body.len());
        buf.put_u8(FRAME_BEGIN);
        buf.put_u8(FRAME_RESERVED_BYTE);
        buf.put_slice(device_id.as_str().as_bytes());
        buf.put_slice(command.as_str().as_bytes());
        buf.put_slice(body.as_bytes());
        buf.put_u8(FRAME_END);
        Self::parse(&buf)
    }

    /// Device id carried at offset 2.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Resolved command code.
    #[must_use]
    pub fn command(&self) -> CommandCode {
        self.command
    }

    /// Wire form of the command code.
    #[must_use]
    pub fn command_str(&self) -> &'static str {
        self.command.as_str()
    }

    /// Message body between the command and the end sentinel.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        let bytes = self.block.as_bytes();
        &bytes[BODY_OFFSET..bytes.len() - 1]
    }

    /// Message body rendered as text for logs.
    #[must_use]
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.body())
    }

    /// Fresh copy of the raw frame bytes, sentinels included.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.block.contents()
    }

    /// Borrow the raw frame bytes, sentinels included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.block.as_bytes()
    }

    /// Total frame length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.block.len()
    }

    /// Frames are never empty; present for clippy's `len` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Log rendering: device id + command + body, without wire framing.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.device_id,
            self.command_str(),
            self.body_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn device() -> DeviceId {
        DeviceId::new("35701588506").unwrap()
    }

    #[test]
    fn test_build_round_trip() {
        let frame = Frame::build(&device(), CommandCode::HandshakeAck, "HSO").unwrap();
        let parsed = Frame::parse(&frame.contents()).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn test_build_layout() {
        let frame = Frame::build(&device(), CommandCode::Handshake, "").unwrap();
        let bytes = frame.contents();

        assert_eq!(bytes.len(), FRAME_MIN_SIZE);
        assert_eq!(bytes[0], FRAME_BEGIN);
        assert_eq!(bytes[1], FRAME_RESERVED_BYTE);
        assert_eq!(&bytes[2..13], b"35701588506");
        assert_eq!(&bytes[13..17], b"BP00");
        assert_eq!(bytes[17], FRAME_END);
    }

    #[test]
    fn test_accessors() {
        let frame = Frame::build(&device(), CommandCode::Feedback, "payload").unwrap();
        assert_eq!(frame.device_id().as_str(), "35701588506");
        assert_eq!(frame.device_id().as_u64(), 35_701_588_506);
        assert_eq!(frame.command(), CommandCode::Feedback);
        assert_eq!(frame.command_str(), "BR00");
        assert_eq!(frame.body(), b"payload");
        assert_eq!(frame.body_str(), "payload");
    }

    #[test]
    fn test_display_is_log_form() {
        let frame = Frame::build(&device(), CommandCode::HandshakeAck, "HSO").unwrap();
        assert_eq!(frame.to_string(), "35701588506AP01HSO");
    }

    #[rstest]
    #[case(17)] // one byte short
    #[case(0)]
    fn test_too_short_rejected(#[case] len: usize) {
        let raw = vec![FRAME_BEGIN; len];
        assert!(matches!(
            Frame::parse(&raw),
            Err(Error::SizeViolation { .. })
        ));
    }

    #[test]
    fn test_too_long_rejected() {
        let mut raw = vec![b'0'; FRAME_MAX_SIZE + 1];
        raw[0] = FRAME_BEGIN;
        *raw.last_mut().unwrap() = FRAME_END;
        assert!(matches!(
            Frame::parse(&raw),
            Err(Error::SizeViolation { .. })
        ));
    }

    #[test]
    fn test_max_size_accepted() {
        let body = "x".repeat(FRAME_MAX_SIZE - FRAME_MIN_SIZE);
        let frame = Frame::build(&device(), CommandCode::Feedback, &body).unwrap();
        assert_eq!(frame.len(), FRAME_MAX_SIZE);
    }

    #[test]
    fn test_bad_begin_sentinel() {
        let mut raw = Frame::build(&device(), CommandCode::Handshake, "").unwrap().contents();
        raw[0] = b'[';
        assert!(matches!(
            Frame::parse(&raw),
            Err(Error::SentinelMismatch {
                position: "begin",
                ..
            })
        ));
    }

    #[test]
    fn test_bad_end_sentinel() {
        let mut raw = Frame::build(&device(), CommandCode::Handshake, "").unwrap().contents();
        *raw.last_mut().unwrap() = b']';
        assert!(matches!(
            Frame::parse(&raw),
            Err(Error::SentinelMismatch {
                position: "end",
                ..
            })
        ));
    }

    #[test]
    fn test_non_digit_device_id() {
        let mut raw = Frame::build(&device(), CommandCode::Handshake, "").unwrap().contents();
        raw[2] = b'A';
        assert!(matches!(
            Frame::parse(&raw),
            Err(Error::MalformedFrame { .. })
        ));
    }

    #[test]
    fn test_unknown_command_rejected_with_context() {
        let mut raw = Frame::build(&device(), CommandCode::Handshake, "").unwrap().contents();
        raw[13..17].copy_from_slice(b"ZZ99");

        match Frame::parse(&raw) {
            Err(Error::MalformedFrame { frame, source }) => {
                assert!(frame.contains("ZZ99"));
                assert!(matches!(*source, Error::UnknownCommand { .. }));
            }
            other => panic!("expected MalformedFrame, got {other:?}"),
        }
    }
}
