use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device record as owned by the external directory.
///
/// The dispatcher only reads this; the single write path is the heartbeat,
/// which asks the directory to persist a fresh `last_online`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Directory identifier, opaque to this crate.
    pub id: String,

    /// Human-facing device code printed on the terminal.
    pub code: String,

    /// Display name.
    pub name: String,

    /// Terminal address. Empty when the device was registered but never
    /// provisioned with an endpoint.
    pub ip_address: String,

    /// Terminal port. Zero means unprovisioned.
    pub port: u16,

    /// Family string as recorded by the directory, e.g. `"ACCESS"`.
    pub device_type: String,

    /// Manufacturer string, free-form.
    pub manufacturer: String,

    /// Last time a heartbeat was accepted for this device.
    pub last_online: Option<DateTime<Utc>>,
}

impl Device {
    /// Whether the record carries a usable network endpoint.
    ///
    /// The transport refuses to dial without one, so callers can use this
    /// to skip devices that were registered but never provisioned.
    #[must_use]
    pub fn has_endpoint(&self) -> bool {
        !self.ip_address.trim().is_empty() && self.port > 0
    }

    /// `host:port` form for dialing.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.ip_address, self.port)
    }
}

/// Hardware family a device or protocol tag belongs to.
///
/// Families share a command vocabulary; the command builder keys its verb
/// table on this. Detection is prefix-based so versioned protocol tags
/// (`ACCESS_ENTROPY_V4_8`) and plain directory type strings (`ACCESS`)
/// resolve the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceFamily {
    /// Access-control terminals (doors, turnstiles).
    Access,
    /// Attendance terminals (clock-in/clock-out).
    Attendance,
    /// Consumption/POS terminals (canteen, vending).
    Consume,
}

impl DeviceFamily {
    /// Detect the family from a protocol tag or a directory type string.
    ///
    /// Returns `None` for anything that matches no known family; callers
    /// fall back to the generic verb column in that case.
    #[must_use]
    pub fn detect(tag: &str) -> Option<Self> {
        let upper = tag.trim().to_ascii_uppercase();
        if upper.starts_with("ACCESS") {
            Some(DeviceFamily::Access)
        } else if upper.starts_with("ATTENDANCE") {
            Some(DeviceFamily::Attendance)
        } else if upper.starts_with("CONSUME") {
            Some(DeviceFamily::Consume)
        } else {
            None
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeviceFamily::Access => write!(f, "ACCESS"),
            DeviceFamily::Attendance => write!(f, "ATTENDANCE"),
            DeviceFamily::Consume => write!(f, "CONSUME"),
        }
    }
}

/// Health classification of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Device answered and reported itself healthy.
    Healthy,
    /// Device reachable but failing, or unreachable.
    Unhealthy,
    /// Could not be determined (device or handler missing).
    Unknown,
    /// Device answered with something the handler could not make sense of.
    Error,
}

impl HealthStatus {
    /// Wire/string form, matching what devices report in `healthStatus`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "HEALTHY",
            HealthStatus::Unhealthy => "UNHEALTHY",
            HealthStatus::Unknown => "UNKNOWN",
            HealthStatus::Error => "ERROR",
        }
    }

    /// Parse a device-reported status, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HEALTHY" => Some(HealthStatus::Healthy),
            "UNHEALTHY" => Some(HealthStatus::Unhealthy),
            "UNKNOWN" => Some(HealthStatus::Unknown),
            "ERROR" => Some(HealthStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one health check against one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub device_id: String,
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
    pub response_time_ms: u64,
    pub message: String,
}

impl HealthReport {
    /// Report for a device that could not be checked at all.
    #[must_use]
    pub fn unknown(device_id: impl Into<String>, message: impl Into<String>) -> Self {
        HealthReport {
            device_id: device_id.into(),
            status: HealthStatus::Unknown,
            checked_at: Utc::now(),
            response_time_ms: 0,
            message: message.into(),
        }
    }
}

/// Point-in-time runtime metrics of one device.
///
/// All numeric fields are always present; degraded snapshots are zeroed
/// rather than absent so callers never deal with nulls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub device_id: String,
    pub cpu_usage: f64,
    pub memory_usage: i64,
    pub network_latency_ms: f64,
    pub response_time_ms: u64,
    pub error_rate: f64,
    pub updated_at: DateTime<Utc>,
}

impl MetricsSnapshot {
    /// The degraded all-zero shape.
    #[must_use]
    pub fn zeroed(device_id: impl Into<String>) -> Self {
        MetricsSnapshot {
            device_id: device_id.into(),
            cpu_usage: 0.0,
            memory_usage: 0,
            network_latency_ms: 0.0,
            response_time_ms: 0,
            error_rate: 0.0,
            updated_at: Utc::now(),
        }
    }
}

/// Acknowledgement of a device heartbeat.
///
/// Heartbeats never contact the device; they only persist the sighting
/// through the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatAck {
    pub device_id: String,
    pub accepted: bool,
    pub received_at: DateTime<Utc>,
    pub message: String,
}
