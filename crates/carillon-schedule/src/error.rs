use thiserror::Error;

use crate::field::Field;

/// Schedule construction and composition errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// A selector admitted no value at all for a unit. Rotating an empty
    /// ring is undefined, so this is rejected before any ticking can occur.
    #[error("Field {0} admits no values")]
    EmptyField(Field),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// The admitted days of month can never compose with the admitted
    /// months (e.g. day 31 with February as the only month).
    #[error(
        "day-of-month selection starts at {day}, but the longest admitted month has {limit} days"
    )]
    UnsatisfiableDate { day: u32, limit: u32 },

    #[error(transparent)]
    CoreError(#[from] carillon_core::error::CoreError),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;
