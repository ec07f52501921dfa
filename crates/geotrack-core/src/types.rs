use crate::{
    Result,
    constants::DEVICE_ID_LENGTH,
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tracker device identifier: exactly 11 ASCII digits, as transmitted in
/// every frame (usually the SIM phone number of the unit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a new device id with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidDeviceId` if the input is not exactly
    /// 11 ASCII digits.
    pub fn new(id: &str) -> Result<Self> {
        if id.len() != DEVICE_ID_LENGTH || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidDeviceId {
                raw: id.to_string(),
                expected_len: DEVICE_ID_LENGTH,
            });
        }
        Ok(DeviceId(id.to_string()))
    }

    /// Get the device id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form of the device id. Eleven digits always fit in a `u64`.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        // Constructor guarantees 11 ASCII digits
        self.0.parse().unwrap_or(0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DeviceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DeviceId::new(s)
    }
}

/// Administrative status of a tracker record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackerStatus {
    Enabled,
    Disabled,
    Fault,
}

impl TrackerStatus {
    /// Stable text form used in the database and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrackerStatus::Enabled => "enabled",
            TrackerStatus::Disabled => "disabled",
            TrackerStatus::Fault => "fault",
        }
    }
}

impl fmt::Display for TrackerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TrackerStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "enabled" => Ok(TrackerStatus::Enabled),
            "disabled" => Ok(TrackerStatus::Disabled),
            "fault" => Ok(TrackerStatus::Fault),
            other => Err(Error::InvalidValue {
                field: "tracker status",
                raw: other.to_string(),
            }),
        }
    }
}

/// Connection state of a tracker as observed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Online,
    Offline,
}

impl ConnectionStatus {
    /// Stable text form used in the database and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Online => "online",
            ConnectionStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ConnectionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "online" => Ok(ConnectionStatus::Online),
            "offline" => Ok(ConnectionStatus::Offline),
            other => Err(Error::InvalidValue {
                field: "connection status",
                raw: other.to_string(),
            }),
        }
    }
}
