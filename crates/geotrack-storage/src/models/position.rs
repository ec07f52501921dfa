use chrono::{DateTime, NaiveDateTime, Utc};
use geotrack_protocol::LocationReport;
use serde::{Deserialize, Serialize};

/// One persisted GPS fix, linked to the tracker that reported it.
///
/// Maps to the `positions` table. `fix_time` is the timestamp the device
/// itself reported (UTC-naive, straight from the 62-byte record);
/// `created_at` is when the server stored the row — the gap between the two
/// shows delivery latency and device clock drift.
///
/// Single-character wire fields (availability, hemisphere indicators, mile
/// post) are stored as one-character TEXT columns.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Position {
    /// Auto-increment primary key (0 until persisted)
    pub id: i64,

    /// Owning tracker row
    pub tracker_id: i64,

    /// Fix timestamp reported by the device
    pub fix_time: NaiveDateTime,

    /// When the server stored the row
    pub created_at: DateTime<Utc>,

    /// `A` for a valid satellite fix, `V` for void
    pub availability: String,

    /// Decimal degrees, positive magnitude
    pub latitude: f64,

    /// `N` or `S`
    pub latitude_indicator: String,

    /// Decimal degrees, positive magnitude
    pub longitude: f64,

    /// `E` or `W`
    pub longitude_indicator: String,

    /// Speed over ground, device units
    pub speed: f64,

    /// Heading in degrees
    pub heading: f64,

    /// Opaque I/O status bits from the device
    pub io_state: String,

    /// Mile post marker
    pub mile_post: String,

    /// Opaque mileage string
    pub mile_data: String,
}

impl Position {
    /// Build a row from a decoded location report.
    #[must_use]
    pub fn from_report(tracker_id: i64, report: &LocationReport) -> Self {
        Self {
            id: 0,
            tracker_id,
            fix_time: report.timestamp,
            created_at: Utc::now(),
            availability: report.availability.to_string(),
            latitude: report.latitude,
            latitude_indicator: report.latitude_indicator.to_string(),
            longitude: report.longitude,
            longitude_indicator: report.longitude_indicator.to_string(),
            speed: report.speed,
            heading: report.heading,
            io_state: report.io_state.clone(),
            mile_post: report.mile_post.to_string(),
            mile_data: report.mile_data.clone(),
        }
    }
}
