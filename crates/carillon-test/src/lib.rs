//! Carillon scheduler - end-to-end test support.

use chrono::{NaiveDate, NaiveDateTime};

/// A civil datetime literal for test references and expectations.
///
/// # Panics
/// Panics on an invalid date or time; test inputs are literals.
#[must_use]
pub fn civil(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .unwrap_or_else(|| panic!("invalid civil literal {year}-{month}-{day} {hour}:{minute}:{second}"))
}
