//! Punch events reported by clock devices.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::timefmt::{format_time, parse_timestamp};
use crate::types::{Confidence, Direction, ValidationError};

/// A raw punch as delivered by a device or storage row.
///
/// Reconciliation works on this trait so it can consume different row
/// representations (e.g. `StoredPunch` from att-db, or test fixtures)
/// without first forcing them through validation. Fields are kept as text
/// because devices are not trusted to send well-formed values.
pub trait RawPunch {
    /// The punch timestamp in local wall-clock time.
    fn time(&self) -> &str;

    /// `in`, `out` or `break`.
    fn direction(&self) -> &str;

    /// Identifier of the reporting device.
    fn device_id(&self) -> &str;

    /// Device-reported confidence: `high`, `medium` or `low`.
    fn confidence(&self) -> &str;

    /// Whether the punch was synthesized rather than observed.
    fn inferred(&self) -> bool;
}

/// A single validated punch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PunchLog {
    time: NaiveDateTime,
    direction: Direction,
    device_id: String,
    confidence: Confidence,
    #[serde(default)]
    inferred: bool,
}

impl PunchLog {
    pub fn new(
        time: NaiveDateTime,
        direction: Direction,
        device_id: impl Into<String>,
        confidence: Confidence,
        inferred: bool,
    ) -> Self {
        Self {
            time,
            direction,
            device_id: device_id.into(),
            confidence,
            inferred,
        }
    }

    /// Validates a raw punch.
    ///
    /// `day` anchors bare `HH:MM` timestamps.
    pub fn parse<P: RawPunch + ?Sized>(
        raw: &P,
        day: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        let time = parse_timestamp(raw.time(), day)?;
        let direction = raw.direction().parse()?;
        let confidence = raw.confidence().parse()?;
        Ok(Self::new(
            time,
            direction,
            raw.device_id(),
            confidence,
            raw.inferred(),
        ))
    }

    pub const fn time(&self) -> NaiveDateTime {
        self.time
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub const fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub const fn inferred(&self) -> bool {
        self.inferred
    }

    /// `HH:MM` (24-hour) time of day.
    pub fn time_formatted(&self) -> String {
        format_time(Some(self.time.time()))
    }

    /// High device confidence and directly observed.
    pub fn is_reliable(&self) -> bool {
        self.confidence == Confidence::High && !self.inferred
    }

    /// Same instant and same direction.
    pub fn is_duplicate_of(&self, other: &Self) -> bool {
        self.time == other.time && self.direction == other.direction
    }
}

/// An owned raw punch, as read from import files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchRecord {
    pub time: String,
    pub direction: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default = "default_confidence")]
    pub confidence: String,
    #[serde(default)]
    pub inferred: bool,
}

fn default_confidence() -> String {
    Confidence::High.as_str().to_string()
}

impl PunchRecord {
    /// Convenience constructor for an observed high-confidence punch.
    pub fn observed(time: impl Into<String>, direction: Direction, device_id: &str) -> Self {
        Self {
            time: time.into(),
            direction: direction.as_str().to_string(),
            device_id: device_id.to_string(),
            confidence: default_confidence(),
            inferred: false,
        }
    }
}

impl RawPunch for PunchRecord {
    fn time(&self) -> &str {
        &self.time
    }

    fn direction(&self) -> &str {
        &self.direction
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn confidence(&self) -> &str {
        &self.confidence
    }

    fn inferred(&self) -> bool {
        self.inferred
    }
}

impl From<&PunchLog> for PunchRecord {
    fn from(log: &PunchLog) -> Self {
        Self {
            time: log.time.format("%Y-%m-%dT%H:%M:%S").to_string(),
            direction: log.direction.as_str().to_string(),
            device_id: log.device_id.clone(),
            confidence: log.confidence.as_str().to_string(),
            inferred: log.inferred,
        }
    }
}
