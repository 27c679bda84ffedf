//! Attendance status as the single source of truth for status strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::ValidationError;

/// Classification of a single attendance day.
///
/// `Present` and `Late` are derived from punches. `Sick` and `Vacation` come
/// from an external leave system and pass through reconciliation untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Sick,
    Vacation,
    Break,
    Ambiguous,
}

impl AttendanceStatus {
    /// All variants, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Present,
        Self::Late,
        Self::Absent,
        Self::Sick,
        Self::Vacation,
        Self::Break,
        Self::Ambiguous,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Late => "late",
            Self::Absent => "absent",
            Self::Sick => "sick",
            Self::Vacation => "vacation",
            Self::Break => "break",
            Self::Ambiguous => "ambiguous",
        }
    }

    /// Present or late.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Statuses owned by the leave system rather than by punches.
    #[must_use]
    pub const fn is_leave(&self) -> bool {
        matches!(self, Self::Sick | Self::Vacation)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ValidationError::InvalidStatus {
                value: s.to_string(),
            })
    }
}

impl Serialize for AttendanceStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AttendanceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
