//! Location report codec for feedback (`BR00`) frame bodies.
//!
//! The body is a fixed 62-byte ASCII record with these fields:
//!
//! ```text
//! offset  len  field
//! 0       6    date, yyMMdd
//! 6       1    availability flag, 'A' (valid fix) / 'V' (void)
//! 7       9    latitude, DDMM.MMMM digits
//! 16      1    latitude indicator, 'N' / 'S'
//! 17      10   longitude, DDDMM.MMMM digits
//! 27      1    longitude indicator, 'E' / 'W'
//! 28      5    speed
//! 33      6    time, HHmmss
//! 39      6    heading
//! 45      8    I/O state bits (opaque)
//! 53      1    mile post
//! 54      8    mile data (opaque)
//! ```
//!
//! Latitude and longitude arrive NMEA-style as degrees plus decimal minutes;
//! the decode converts them to plain decimal degrees.

use chrono::NaiveDateTime;
use geotrack_core::{Error, Result, constants::LOCATION_RECORD_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

const DATE_RANGE: std::ops::Range<usize> = 0..6;
const AVAILABILITY_OFFSET: usize = 6;
const LATITUDE_RANGE: std::ops::Range<usize> = 7..16;
const LATITUDE_INDICATOR_OFFSET: usize = 16;
const LONGITUDE_RANGE: std::ops::Range<usize> = 17..27;
const LONGITUDE_INDICATOR_OFFSET: usize = 27;
const SPEED_RANGE: std::ops::Range<usize> = 28..33;
const TIME_RANGE: std::ops::Range<usize> = 33..39;
const HEADING_RANGE: std::ops::Range<usize> = 39..45;
const IO_STATE_RANGE: std::ops::Range<usize> = 45..53;
const MILE_POST_OFFSET: usize = 53;
const MILE_DATA_RANGE: std::ops::Range<usize> = 54..62;

/// One decoded GPS fix.
///
/// Immutable once parsed; the session consumes it exactly once to build a
/// persistence record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    /// Fix timestamp reported by the device (UTC-naive)
    pub timestamp: NaiveDateTime,

    /// `'A'` when the fix is valid, `'V'` when void
    pub availability: char,

    /// Decimal degrees, positive magnitude; hemisphere in the indicator
    pub latitude: f64,

    /// `'N'` or `'S'`
    pub latitude_indicator: char,

    /// Decimal degrees, positive magnitude; hemisphere in the indicator
    pub longitude: f64,

    /// `'E'` or `'W'`
    pub longitude_indicator: char,

    /// Speed over ground, device units
    pub speed: f64,

    /// Heading in degrees
    pub heading: f64,

    /// Opaque 8-character I/O status string
    pub io_state: String,

    /// Mile post marker character
    pub mile_post: char,

    /// Opaque 8-character mileage string
    pub mile_data: String,
}

impl LocationReport {
    /// Decode a fixed 62-byte feedback body.
    ///
    /// # Errors
    /// - `Error::SizeViolation` — the body is not exactly 62 bytes
    /// - `Error::DateParse` — date/time substrings do not match
    ///   `yyMMdd`/`HHmmss`
    /// - `Error::NumericParse` — a numeric field is not a decimal number
    pub fn parse(body: &[u8]) -> Result<Self> {
        if body.len() != LOCATION_RECORD_SIZE {
            return Err(Error::SizeViolation {
                min: LOCATION_RECORD_SIZE,
                max: LOCATION_RECORD_SIZE,
                actual: body.len(),
            });
        }

        let date = ascii_field(body, DATE_RANGE);
        let time = ascii_field(body, TIME_RANGE);
        let timestamp =
            NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%y%m%d %H%M%S").map_err(
                |_| Error::DateParse {
                    date: date.into_owned(),
                    time: time.into_owned(),
                },
            )?;

        let latitude_raw = numeric_field(body, LATITUDE_RANGE, "latitude")?;
        let longitude_raw = numeric_field(body, LONGITUDE_RANGE, "longitude")?;

        Ok(Self {
            timestamp,
            availability: body[AVAILABILITY_OFFSET] as char,
            latitude: degrees_minutes_to_decimal(latitude_raw),
            latitude_indicator: body[LATITUDE_INDICATOR_OFFSET] as char,
            longitude: degrees_minutes_to_decimal(longitude_raw),
            longitude_indicator: body[LONGITUDE_INDICATOR_OFFSET] as char,
            speed: numeric_field(body, SPEED_RANGE, "speed")?,
            heading: numeric_field(body, HEADING_RANGE, "heading")?,
            io_state: ascii_field(body, IO_STATE_RANGE).into_owned(),
            mile_post: body[MILE_POST_OFFSET] as char,
            mile_data: ascii_field(body, MILE_DATA_RANGE).into_owned(),
        })
    }

    /// Whether the device reported a usable satellite fix.
    #[must_use]
    pub fn is_valid_fix(&self) -> bool {
        self.availability == 'A'
    }
}

impl fmt::Display for LocationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            self.latitude, self.latitude_indicator, self.longitude, self.longitude_indicator
        )
    }
}

/// Convert an NMEA-style `DDDMM.MMMM` value (as decoded, before scaling) to
/// decimal degrees: scale by 1/100 once, then split the degree part off and
/// turn the minute remainder into a degree fraction.
fn degrees_minutes_to_decimal(raw: f64) -> f64 {
    let scaled = raw / 100.0;
    let degrees = scaled.floor();
    let minutes = (scaled - degrees) * 100.0;
    degrees + minutes / 60.0
}

fn ascii_field(body: &[u8], range: std::ops::Range<usize>) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(&body[range])
}

fn numeric_field(body: &[u8], range: std::ops::Range<usize>, field: &'static str) -> Result<f64> {
    let text = ascii_field(body, range);
    text.trim().parse().map_err(|_| Error::NumericParse {
        field,
        raw: text.into_owned(),
    })
}
