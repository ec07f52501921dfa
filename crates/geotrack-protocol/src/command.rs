//! Command codes and the static command table.
//!
//! Every frame carries a 4-character command: a 2-letter category pair
//! followed by a 2-digit serial number. The full 4-character string must
//! resolve against the table below; anything else makes the whole frame a
//! parse failure, never a silently ignored message.
//!
//! | code | direction | purpose | handler |
//! |------|-----------|---------|---------|
//! | AP01 | server → device | handshake acknowledgment | — |
//! | AP05 | server → device | login acknowledgment | — |
//! | BP00 | device → server | handshake signal | handshake |
//! | BP05 | device → server | login | login |
//! | BR00 | device → server | isochronous feedback report | feedback |
//!
//! The deployed trackers always send serial `00`, so the table matches the
//! literal 4-character code rather than wildcarding the serial.

use crate::block::BoundedBlock;
use geotrack_core::{
    Error, Result,
    constants::{COMMAND_MAX_SIZE, COMMAND_MIN_SIZE},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which session handler responds to an inbound command.
///
/// Pure response codes (`AP01`, `AP05`) have no handler. Keeping this a
/// closed enum makes the dispatch table a compile-time-checked property
/// instead of a runtime name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerKind {
    Handshake,
    Login,
    Feedback,
}

/// Static metadata for one command code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Human-readable description used in logs
    pub description: &'static str,

    /// Session handler for the command, if it expects one
    pub handler: Option<HandlerKind>,
}

/// The closed set of command codes the server understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandCode {
    /// `AP01` — answer to the handshake signal
    HandshakeAck,
    /// `AP05` — answer to the login message
    LoginAck,
    /// `BP00` — handshake signal from the device
    Handshake,
    /// `BP05` — login message from the device
    Login,
    /// `BR00` — isochronous and continuous feedback report
    Feedback,
}

impl CommandCode {
    /// Resolve a 4-character code string against the command table.
    ///
    /// # Errors
    /// Returns `Error::UnknownCommand` for any code not in the table.
    pub fn parse(code: &str) -> Result<Self> {
        match code {
            "AP01" => Ok(CommandCode::HandshakeAck),
            "AP05" => Ok(CommandCode::LoginAck),
            "BP00" => Ok(CommandCode::Handshake),
            "BP05" => Ok(CommandCode::Login),
            "BR00" => Ok(CommandCode::Feedback),
            _ => Err(Error::UnknownCommand {
                code: code.to_string(),
            }),
        }
    }

    /// Wire form of the code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CommandCode::HandshakeAck => "AP01",
            CommandCode::LoginAck => "AP05",
            CommandCode::Handshake => "BP00",
            CommandCode::Login => "BP05",
            CommandCode::Feedback => "BR00",
        }
    }

    /// Static descriptor for the code.
    #[must_use]
    pub fn descriptor(self) -> &'static CommandDescriptor {
        match self {
            CommandCode::HandshakeAck => &CommandDescriptor {
                description: "answer handshake signal message",
                handler: None,
            },
            CommandCode::LoginAck => &CommandDescriptor {
                description: "device login response message",
                handler: None,
            },
            CommandCode::Handshake => &CommandDescriptor {
                description: "handshake signal message",
                handler: Some(HandlerKind::Handshake),
            },
            CommandCode::Login => &CommandDescriptor {
                description: "login message",
                handler: Some(HandlerKind::Login),
            },
            CommandCode::Feedback => &CommandDescriptor {
                description: "isochronous and continuous feedback message",
                handler: Some(HandlerKind::Feedback),
            },
        }
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated command block from a frame.
///
/// The block may carry trailing bytes beyond the code (bounds `[4, 1028]`),
/// but the leading four characters are always category pair + 2-digit serial
/// and always resolve in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    block: BoundedBlock,
    code: CommandCode,
}

impl Command {
    /// Parse and validate a command block.
    ///
    /// # Errors
    /// - `Error::SizeViolation` — length outside `[4, 1028]`
    /// - `Error::InvalidSerialNumber` — bytes 2..4 are not ASCII digits
    /// - `Error::UnknownCommand` — the 4-character code is not in the table
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let block = BoundedBlock::new(raw.to_vec(), COMMAND_MIN_SIZE, COMMAND_MAX_SIZE)?;

        let serial = &raw[2..4];
        if !serial.iter().all(u8::is_ascii_digit) {
            return Err(Error::InvalidSerialNumber {
                raw: String::from_utf8_lossy(serial).into_owned(),
            });
        }

        let code_str = String::from_utf8_lossy(&raw[..4]);
        let code = CommandCode::parse(&code_str)?;

        Ok(Self { block, code })
    }

    /// The resolved command code.
    #[must_use]
    pub fn code(&self) -> CommandCode {
        self.code
    }

    /// Static descriptor for the resolved code.
    #[must_use]
    pub fn descriptor(&self) -> &'static CommandDescriptor {
        self.code.descriptor()
    }

    /// Category byte (first letter, message direction).
    #[must_use]
    pub fn category(&self) -> char {
        self.block.as_bytes()[0] as char
    }

    /// Purpose byte (second letter).
    #[must_use]
    pub fn purpose(&self) -> char {
        self.block.as_bytes()[1] as char
    }

    /// Two-digit serial number string.
    #[must_use]
    pub fn serial(&self) -> &str {
        // Validated as ASCII digits at construction
        std::str::from_utf8(&self.block.as_bytes()[2..4]).unwrap_or("00")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.category(), self.purpose(), self.serial())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AP01", CommandCode::HandshakeAck)]
    #[case("AP05", CommandCode::LoginAck)]
    #[case("BP00", CommandCode::Handshake)]
    #[case("BP05", CommandCode::Login)]
    #[case("BR00", CommandCode::Feedback)]
    fn test_code_round_trip(#[case] wire: &str, #[case] code: CommandCode) {
        assert_eq!(CommandCode::parse(wire).unwrap(), code);
        assert_eq!(code.as_str(), wire);
    }

    #[test]
    fn test_feedback_descriptor() {
        let cmd = Command::parse(b"BR00").unwrap();
        let descriptor = cmd.descriptor();
        assert_eq!(descriptor.handler, Some(HandlerKind::Feedback));
        assert!(descriptor.description.contains("feedback"));
    }

    #[test]
    fn test_response_codes_have_no_handler() {
        assert_eq!(CommandCode::HandshakeAck.descriptor().handler, None);
        assert_eq!(CommandCode::LoginAck.descriptor().handler, None);
    }

    #[rstest]
    #[case(&b"ZZ99"[..])]
    #[case(&b"AP02"[..])]
    #[case(&b"br00"[..])] // case-sensitive
    fn test_unknown_command(#[case] raw: &[u8]) {
        assert!(matches!(
            Command::parse(raw),
            Err(Error::UnknownCommand { .. })
        ));
    }

    #[test]
    fn test_serial_must_be_digits() {
        assert!(matches!(
            Command::parse(b"BPXX"),
            Err(Error::InvalidSerialNumber { .. })
        ));
    }

    #[test]
    fn test_size_bounds() {
        assert!(matches!(
            Command::parse(b"BR0"),
            Err(Error::SizeViolation { .. })
        ));

        let oversize = vec![b'A'; 1029];
        assert!(matches!(
            Command::parse(&oversize),
            Err(Error::SizeViolation { .. })
        ));
    }

    #[test]
    fn test_command_accessors() {
        let cmd = Command::parse(b"BP05").unwrap();
        assert_eq!(cmd.category(), 'B');
        assert_eq!(cmd.purpose(), 'P');
        assert_eq!(cmd.serial(), "05");
        assert_eq!(cmd.to_string(), "BP05");
    }

    #[test]
    fn test_command_with_trailing_bytes() {
        // Blocks longer than the code itself stay within bounds
        let cmd = Command::parse(b"BR00extra").unwrap();
        assert_eq!(cmd.code(), CommandCode::Feedback);
    }
}
