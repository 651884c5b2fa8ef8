//! Civil-time frames for composing schedule instants.
//!
//! A schedule runs in one fixed zone: either the host's local timezone or a
//! named IANA zone. Composed civil datetimes resolve to offset-carrying
//! instants with RFC 5545 conventions for DST transitions: the earliest
//! mapping on a fold, a one-hour forward shift on a gap.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{ScheduleError, ScheduleResult};

/// The civil-time frame a schedule is evaluated in. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleZone {
    /// The host's local timezone.
    Local,
    /// A named IANA timezone.
    Named(Tz),
}

impl ScheduleZone {
    /// ## Summary
    /// Resolves an optional IANA timezone name, `None` meaning host-local.
    ///
    /// ## Errors
    /// Returns `ScheduleError::UnknownTimezone` if the name is not an IANA
    /// timezone.
    pub fn from_name(name: Option<&str>) -> ScheduleResult<Self> {
        match name {
            None => Ok(Self::Local),
            Some(raw) => Tz::from_str(raw)
                .map(Self::Named)
                .map_err(|_e| ScheduleError::UnknownTimezone(raw.to_string())),
        }
    }

    /// The current wall-clock instant expressed as civil time in this zone.
    #[must_use]
    pub fn now_civil(&self) -> NaiveDateTime {
        match self {
            Self::Local => chrono::Local::now().naive_local(),
            Self::Named(tz) => Utc::now().with_timezone(tz).naive_local(),
        }
    }

    /// ## Summary
    /// Resolves a civil datetime in this zone to an offset-carrying instant.
    ///
    /// A DST fold resolves to the earliest mapping; a civil time inside a
    /// DST gap shifts forward one hour and retries once. Returns `None`
    /// only when even the shifted time does not exist, which no real
    /// timezone transition produces.
    #[must_use]
    pub fn resolve(&self, civil: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Local => resolve_in(&chrono::Local, civil),
            Self::Named(tz) => resolve_in(tz, civil),
        }
    }
}

fn resolve_in<Z: TimeZone>(zone: &Z, civil: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    match zone.from_local_datetime(&civil) {
        LocalResult::Single(instant) => Some(instant.fixed_offset()),
        LocalResult::Ambiguous(earliest, _latest) => Some(earliest.fixed_offset()),
        LocalResult::None => {
            // DST gap: the civil time was skipped over
            let shifted = civil + TimeDelta::hours(1);
            match zone.from_local_datetime(&shifted) {
                LocalResult::Single(instant) => Some(instant.fixed_offset()),
                LocalResult::Ambiguous(earliest, _latest) => Some(earliest.fixed_offset()),
                LocalResult::None => None,
            }
        }
    }
}

impl Default for ScheduleZone {
    fn default() -> Self {
        Self::Local
    }
}

impl fmt::Display for ScheduleZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}
