//! Reconciled spans of work or break time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::timefmt::format_hours;
use crate::types::{IntervalKind, ValidationError};

/// A `[check_in, check_out)` span.
///
/// `check_out > check_in` is enforced by [`WorkInterval::new`]; there is no
/// way to build a zero or negative length interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WorkInterval {
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
    kind: IntervalKind,
}

impl WorkInterval {
    pub fn new(
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
        kind: IntervalKind,
    ) -> Result<Self, ValidationError> {
        if check_out <= check_in {
            return Err(ValidationError::NonPositiveInterval {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
            kind,
        })
    }

    pub const fn check_in(&self) -> NaiveDateTime {
        self.check_in
    }

    pub const fn check_out(&self) -> NaiveDateTime {
        self.check_out
    }

    pub const fn kind(&self) -> IntervalKind {
        self.kind
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn duration_in_hours(&self) -> f64 {
        (self.check_out - self.check_in).num_milliseconds() as f64 / 3_600_000.0
    }

    pub fn duration_formatted(&self) -> String {
        format_hours(self.duration_in_hours())
    }

    pub const fn is_work(&self) -> bool {
        matches!(self.kind, IntervalKind::Work)
    }

    pub const fn is_break(&self) -> bool {
        matches!(self.kind, IntervalKind::Break)
    }
}

impl<'de> Deserialize<'de> for WorkInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            check_in: NaiveDateTime,
            check_out: NaiveDateTime,
            kind: IntervalKind,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.check_in, raw.check_out, raw.kind).map_err(serde::de::Error::custom)
    }
}
