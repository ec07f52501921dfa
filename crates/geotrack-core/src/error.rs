use thiserror::Error;

/// Protocol-level errors shared across the geotrack crates.
///
/// Every variant is fatal only to the object being constructed (a block, a
/// frame, a command, a location report) — sessions catch these at the
/// dispatch boundary and keep reading.
#[derive(Error, Debug)]
pub enum Error {
    /// Block length outside its declared bounds, or bounds inverted
    #[error("block size must be between {min} and {max} bytes, got {actual}")]
    SizeViolation {
        min: usize,
        max: usize,
        actual: usize,
    },

    /// Frame does not start/end with the expected sentinel byte
    #[error("bad {position} sentinel: expected 0x{expected:02X}, got 0x{actual:02X}")]
    SentinelMismatch {
        position: &'static str,
        expected: u8,
        actual: u8,
    },

    /// Device id field contains non-digit bytes
    #[error("device id must be {expected_len} ASCII digits, got {raw:?}")]
    InvalidDeviceId { raw: String, expected_len: usize },

    /// Command serial number field contains non-digit bytes
    #[error("command serial number must be two ASCII digits, got {raw:?}")]
    InvalidSerialNumber { raw: String },

    /// Command code not present in the command table
    #[error("unknown command code {code:?}")]
    UnknownCommand { code: String },

    /// A frame failed validation; carries the raw frame for logging context
    #[error("malformed frame {frame:?}: {source}")]
    MalformedFrame {
        frame: String,
        #[source]
        source: Box<Error>,
    },

    /// Location record date/time blocks did not match the yyMMdd/HHmmss pattern
    #[error("could not parse date block {date:?} and time block {time:?}")]
    DateParse { date: String, time: String },

    /// A fixed-width ASCII numeric field was not a decimal number
    #[error("could not parse {field} from {raw:?}")]
    NumericParse { field: &'static str, raw: String },

    /// A stored/configured enumeration value was not recognized
    #[error("invalid {field} value {raw:?}")]
    InvalidValue { field: &'static str, raw: String },

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a frame-validation error with the raw frame rendered for logs.
    pub fn in_frame(self, raw: &[u8]) -> Error {
        Error::MalformedFrame {
            frame: String::from_utf8_lossy(raw).into_owned(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
