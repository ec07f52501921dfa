use chrono::{DateTime, Utc};
use geotrack_core::{
    ConnectionStatus, DeviceId, TrackerStatus,
    constants::DEFAULT_RESPONSE_INTERVAL_SECS,
};
use serde::{Deserialize, Serialize};

/// One registered GPS tracker unit.
///
/// Maps to the `trackers` table. The natural key is `device_id` — the
/// 11-digit identifier the unit transmits in every frame, usually its SIM
/// phone number. `status` and `connection_status` are stored as their stable
/// text forms; use [`Tracker::get_status`] / [`Tracker::get_connection_status`]
/// for the typed view.
///
/// # Examples
///
/// ```
/// use geotrack_core::{ConnectionStatus, DeviceId, TrackerStatus};
/// use geotrack_storage::Tracker;
///
/// let device_id = DeviceId::new("35701588506").unwrap();
/// let tracker = Tracker::auto_registered(&device_id);
///
/// assert_eq!(tracker.name, "tracker#35701588506");
/// assert_eq!(tracker.get_status().unwrap(), TrackerStatus::Disabled);
/// assert_eq!(
///     tracker.get_connection_status().unwrap(),
///     ConnectionStatus::Online
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tracker {
    /// Auto-increment primary key (0 until persisted)
    pub id: i64,

    /// 11-digit device identifier from the wire, unique per unit
    pub device_id: String,

    /// Phone number of the SIM in the unit
    pub phone: Option<String>,

    /// Display name
    pub name: String,

    /// IMEI code of the unit, when known
    pub imei: Option<String>,

    /// Free-form operator comment
    pub comment: Option<String>,

    /// Seconds between position reports the unit is configured for
    pub response_interval_secs: i64,

    /// Administrative status text (`enabled` / `disabled` / `fault`)
    pub status: String,

    /// Connection status text (`online` / `offline`)
    pub connection_status: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl Tracker {
    /// Record for a device the server has never seen before.
    ///
    /// New units come up disabled (an operator enables them explicitly) but
    /// are marked online, since a live connection is what created the row.
    #[must_use]
    pub fn auto_registered(device_id: &DeviceId) -> Self {
        Self {
            id: 0,
            device_id: device_id.as_str().to_string(),
            phone: Some(device_id.as_str().to_string()),
            name: format!("tracker#{device_id}"),
            imei: None,
            comment: Some("registered automatically by the server".to_string()),
            response_interval_secs: DEFAULT_RESPONSE_INTERVAL_SECS,
            status: TrackerStatus::Disabled.as_str().to_string(),
            connection_status: ConnectionStatus::Online.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Typed view of the administrative status column.
    pub fn get_status(&self) -> geotrack_core::Result<TrackerStatus> {
        self.status.parse()
    }

    /// Typed view of the connection status column.
    pub fn get_connection_status(&self) -> geotrack_core::Result<ConnectionStatus> {
        self.connection_status.parse()
    }

    /// Set the connection status column from the typed value.
    pub fn set_connection_status(&mut self, status: ConnectionStatus) {
        self.connection_status = status.as_str().to_string();
    }

    /// Whether an operator has enabled this unit.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.status == TrackerStatus::Enabled.as_str()
    }
}
