//! Protocol constants for the tracker wire format.
//!
//! The tracker protocol frames every message between fixed sentinel bytes:
//!
//! ```text
//! ( 0 35701588506 BR00 <body...> )
//! ^ ^ ^^^^^^^^^^^ ^^^^           ^
//! | |      |        |            end sentinel 0x29
//! | |      |        4-char command code
//! | |      11-digit device id (ASCII)
//! | reserved byte
//! begin sentinel 0x28
//! ```
//!
//! All offsets below are relative to the start of the frame. Modifying these
//! values breaks compatibility with deployed tracker hardware.

// ============================================================================
// Frame layout
// ============================================================================

/// Begin-of-frame sentinel, ASCII `'('`.
pub const FRAME_BEGIN: u8 = 0x28;

/// End-of-frame sentinel, ASCII `')'`.
pub const FRAME_END: u8 = 0x29;

/// Smallest valid frame: sentinels + reserved byte + device id + command,
/// with an empty body.
pub const FRAME_MIN_SIZE: usize = 18;

/// Largest valid frame: the minimum plus a 1024-byte body.
pub const FRAME_MAX_SIZE: usize = FRAME_MIN_SIZE + 1024;

/// Value the builder writes into the reserved byte at offset 1.
pub const FRAME_RESERVED_BYTE: u8 = b'0';

/// Offset of the device id field.
pub const DEVICE_ID_OFFSET: usize = 2;

/// Device id length in ASCII digits.
pub const DEVICE_ID_LENGTH: usize = 11;

/// Offset of the 4-character command code.
pub const COMMAND_OFFSET: usize = 13;

/// Command code length in bytes.
pub const COMMAND_LENGTH: usize = 4;

/// Offset of the message body (everything up to the end sentinel).
pub const BODY_OFFSET: usize = 17;

// ============================================================================
// Command block bounds
// ============================================================================

/// Smallest valid command block (the 4-character code alone).
pub const COMMAND_MIN_SIZE: usize = 4;

/// Largest valid command block.
pub const COMMAND_MAX_SIZE: usize = COMMAND_MIN_SIZE + 1024;

// ============================================================================
// Location record
// ============================================================================

/// Fixed size of the feedback (`BR00`) message body in bytes.
pub const LOCATION_RECORD_SIZE: usize = 62;

// ============================================================================
// Session / server behavior
// ============================================================================

/// Initial capacity of the per-connection receive buffer.
pub const READ_BUFFER_SIZE: usize = 4096;

/// Body of the `AP01` handshake acknowledgment, per the device datasheet.
pub const HANDSHAKE_ACK_BODY: &str = "HSO";

/// Response interval assigned to auto-registered trackers (seconds).
pub const DEFAULT_RESPONSE_INTERVAL_SECS: i64 = 30;

/// Default budget for acquiring a row lock before giving up.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// How long `stop()` waits for an owned task to finish before aborting it.
pub const SHUTDOWN_WAIT_MS: u64 = 10_000;

/// Polling interval used while waiting for an owned task to finish.
pub const SHUTDOWN_POLL_INTERVAL_MS: u64 = 100;
