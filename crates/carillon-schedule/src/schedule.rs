//! The schedule engine: six admissible-value rings and a free-running year.
//!
//! Carries cannot be resolved field by field: day-of-month validity depends
//! on the concurrently selected month, and weekday admissibility depends on
//! the fully composed date. Ticking therefore interleaves ring rotation
//! with whole-date re-validation instead of computing a closed-form "next
//! valid day".

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use carillon_core::config::ScheduleConfig;

use crate::error::{ScheduleError, ScheduleResult};
use crate::field::Field;
use crate::ring::{Direction, FieldRing};
use crate::selector::Selector;
use crate::zone::ScheduleZone;

/// The six per-unit selectors and the civil-time frame of a schedule.
///
/// The default spec admits every instant in the host's local timezone.
#[derive(Debug, Default)]
pub struct ScheduleSpec {
    pub seconds: Selector,
    pub minutes: Selector,
    pub hours: Selector,
    pub days: Selector,
    pub months: Selector,
    /// Weekdays numbered days-from-Sunday, 0-6. Only ever a filter: the
    /// engine never positions by weekday.
    pub weekdays: Selector,
    pub timezone: ScheduleZone,
}

impl ScheduleSpec {
    /// ## Summary
    /// Builds a spec from the configuration section.
    ///
    /// ## Errors
    /// Returns a validation error for a malformed per-unit spec and
    /// `ScheduleError::UnknownTimezone` for an unresolvable zone name.
    pub fn from_config(config: &ScheduleConfig) -> ScheduleResult<Self> {
        config.validate()?;

        Ok(Self {
            seconds: Selector::from_spec(&config.seconds),
            minutes: Selector::from_spec(&config.minutes),
            hours: Selector::from_spec(&config.hours),
            days: Selector::from_spec(&config.days),
            months: Selector::from_spec(&config.months),
            weekdays: Selector::from_spec(&config.weekdays),
            timezone: ScheduleZone::from_name(config.timezone.as_deref())?,
        })
    }
}

/// A positioned schedule: the cooperating rings, the year, and the zone.
///
/// Between calls, the composed (year, month, day, hour, minute, second)
/// tuple denotes a calendar-valid date whose weekday is admitted;
/// intermediate states inside a tick may be invalid and are never reported.
///
/// Not safe for concurrent mutation: one owner calls `init` once, then
/// `tick` sequentially.
#[derive(Debug)]
pub struct Schedule {
    seconds: FieldRing,
    minutes: FieldRing,
    hours: FieldRing,
    days: FieldRing,
    months: FieldRing,
    weekdays: FieldRing,
    year: i32,
    zone: ScheduleZone,
}

/// The length of `month` in its longest year. February counts its leap-year
/// length.
const fn longest_month_len(month: u32) -> u32 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl Schedule {
    /// ## Summary
    /// Evaluates the selectors over each unit's domain and builds the rings.
    ///
    /// ## Errors
    /// Returns `ScheduleError::EmptyField` if any selector admits nothing,
    /// and `ScheduleError::UnsatisfiableDate` if no admitted day of month
    /// fits in any admitted month.
    pub fn new(spec: &ScheduleSpec) -> ScheduleResult<Self> {
        let schedule = Self {
            seconds: FieldRing::from_selector(Field::Second, &spec.seconds)?,
            minutes: FieldRing::from_selector(Field::Minute, &spec.minutes)?,
            hours: FieldRing::from_selector(Field::Hour, &spec.hours)?,
            days: FieldRing::from_selector(Field::DayOfMonth, &spec.days)?,
            months: FieldRing::from_selector(Field::Month, &spec.months)?,
            weekdays: FieldRing::from_selector(Field::Weekday, &spec.weekdays)?,
            year: 0,
            zone: spec.timezone,
        };

        // The date-settling loop walks day/month/year until a composable
        // date appears; that walk only terminates if one exists at all.
        let day = schedule.days.first();
        let limit = schedule.months.values().map(longest_month_len).max();
        let limit = limit.ok_or(ScheduleError::InvariantViolation("month ring is empty"))?;
        if day > limit {
            return Err(ScheduleError::UnsatisfiableDate { day, limit });
        }

        Ok(schedule)
    }

    /// The civil-time frame this schedule is evaluated in.
    #[must_use]
    pub const fn zone(&self) -> ScheduleZone {
        self.zone
    }

    /// ## Summary
    /// Seeds the rings from the zone's current wall clock.
    ///
    /// ## Errors
    /// Returns `ScheduleError::InvariantViolation` if an instant cannot be
    /// composed, which a successfully constructed schedule never produces.
    pub fn init(&mut self) -> ScheduleResult<()> {
        self.init_at(self.zone.now_civil())
    }

    /// ## Summary
    /// Seeds the rings from an explicit civil reference instant.
    ///
    /// Positions every ring at or after its component of `reference`,
    /// propagating positioning wraps to the next-coarser unit and resetting
    /// finer rings whenever a ring moves past its target, then settles date
    /// validity and the weekday filter forward. The result overshoots the
    /// reference, so one backward tick leaves the next forward tick on the
    /// first admitted instant strictly after `reference`.
    ///
    /// ## Errors
    /// Returns `ScheduleError::InvariantViolation` if an instant cannot be
    /// composed, which a successfully constructed schedule never produces.
    pub fn init_at(&mut self, reference: NaiveDateTime) -> ScheduleResult<()> {
        // Only the seconds get the +1 bias: a reference taken exactly on an
        // admitted boundary must not re-fire at that same instant.
        let mut carry = self.seconds.position_at_or_after(reference.second() + 1);

        let target = reference.minute() + u32::from(carry);
        carry = self.minutes.position_at_or_after(target);
        if carry || self.minutes.current() > target {
            self.seconds.reset();
        }

        let target = reference.hour() + u32::from(carry);
        carry = self.hours.position_at_or_after(target);
        if carry || self.hours.current() > target {
            self.minutes.reset();
            self.seconds.reset();
        }

        let target = reference.day() + u32::from(carry);
        carry = self.days.position_at_or_after(target);
        if carry || self.days.current() > target {
            self.reset_time();
        }

        let target = reference.month() + u32::from(carry);
        carry = self.months.position_at_or_after(target);
        if carry || self.months.current() > target {
            self.days.reset();
            self.reset_time();
        }

        self.year = reference.year() + i32::from(carry);

        // The positioned date may not exist (day 31 under April) or may
        // fall on a rejected weekday; settle forward and restart the
        // time-of-day at its earliest admitted instant.
        if !self.date_admitted() {
            self.settle_date(Direction::Forward);
            self.reset_time();
        }

        let composed = self.current()?;
        tracing::trace!(instant = %composed, reference = %reference, "schedule positioned");

        if composed.naive_local() > reference {
            self.tick(Direction::Backward)?;
        }
        Ok(())
    }

    /// ## Summary
    /// Advances or rewinds the schedule by one admitted instant and returns
    /// it.
    ///
    /// Rotates the second ring and propagates wraps: seconds into minutes,
    /// minutes into hours, hours into the day/month/year roll with calendar
    /// re-validation and the weekday filter.
    ///
    /// ## Errors
    /// Returns `ScheduleError::InvariantViolation` if an instant cannot be
    /// composed, which a successfully constructed schedule never produces.
    pub fn tick(&mut self, direction: Direction) -> ScheduleResult<DateTime<FixedOffset>> {
        if self.seconds.rotate(direction)
            && self.minutes.rotate(direction)
            && self.hours.rotate(direction)
        {
            self.rotate_day(direction);
            self.settle_date(direction);
        }
        self.current()
    }

    /// ## Summary
    /// Composes the current instant in the schedule's zone.
    ///
    /// ## Errors
    /// Returns `ScheduleError::InvariantViolation` if the composed tuple
    /// does not denote a representable instant.
    pub fn current(&self) -> ScheduleResult<DateTime<FixedOffset>> {
        let date = self.current_date().ok_or(ScheduleError::InvariantViolation(
            "composed date does not exist in the calendar",
        ))?;
        let time = NaiveTime::from_hms_opt(
            self.hours.current(),
            self.minutes.current(),
            self.seconds.current(),
        )
        .ok_or(ScheduleError::InvariantViolation(
            "composed time of day is out of range",
        ))?;
        self.zone
            .resolve(date.and_time(time))
            .ok_or(ScheduleError::InvariantViolation(
                "instant is not representable in the schedule timezone",
            ))
    }

    fn current_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.months.current(), self.days.current())
    }

    /// Whether the composed date exists and its weekday is admitted.
    fn date_admitted(&self) -> bool {
        self.current_date()
            .is_some_and(|date| self.weekdays.contains(date.weekday().num_days_from_sunday()))
    }

    /// One day-ring step with carries: a day wrap rotates the month, a
    /// month wrap steps the year.
    fn rotate_day(&mut self, direction: Direction) {
        if self.days.rotate(direction) && self.months.rotate(direction) {
            self.year += direction.year_step();
        }
    }

    /// Rotates the day ring until the composed date exists and its weekday
    /// is admitted. A nonexistent date is treated exactly like a day-ring
    /// wrap, so day selections valid only in some months (day 31 under
    /// February, April, ...) roll through to the next admitted month.
    fn settle_date(&mut self, direction: Direction) {
        while !self.date_admitted() {
            self.rotate_day(direction);
        }
    }

    fn reset_time(&mut self) {
        self.hours.reset();
        self.minutes.reset();
        self.seconds.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    fn civil(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn utc_spec() -> ScheduleSpec {
        ScheduleSpec {
            timezone: ScheduleZone::Named(Tz::UTC),
            ..ScheduleSpec::default()
        }
    }

    fn schedule(spec: &ScheduleSpec) -> Schedule {
        Schedule::new(spec).unwrap()
    }

    fn forward(schedule: &mut Schedule) -> NaiveDateTime {
        schedule.tick(Direction::Forward).unwrap().naive_local()
    }

    fn backward(schedule: &mut Schedule) -> NaiveDateTime {
        schedule.tick(Direction::Backward).unwrap().naive_local()
    }

    #[test]
    fn ticks_every_second_with_the_open_schedule() {
        let mut schedule = schedule(&utc_spec());
        schedule.init_at(civil(2026, 8, 7, 9, 10, 11)).unwrap();

        assert_eq!(forward(&mut schedule), civil(2026, 8, 7, 9, 10, 12));
        assert_eq!(forward(&mut schedule), civil(2026, 8, 7, 9, 10, 13));
    }

    #[test]
    fn second_59_carries_into_the_next_minute() {
        let mut schedule = schedule(&utc_spec());
        schedule.init_at(civil(2026, 8, 7, 9, 10, 59)).unwrap();

        assert_eq!(forward(&mut schedule), civil(2026, 8, 7, 9, 11, 0));
    }

    #[test]
    fn end_of_year_carries_into_january() {
        let mut schedule = schedule(&utc_spec());
        schedule.init_at(civil(2026, 12, 31, 23, 59, 59)).unwrap();

        assert_eq!(forward(&mut schedule), civil(2027, 1, 1, 0, 0, 0));
    }

    #[test]
    fn a_matching_reference_does_not_refire() {
        let spec = ScheduleSpec {
            seconds: Selector::list([0]),
            minutes: Selector::list([0]),
            hours: Selector::list([9]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        // The reference is itself an admitted instant
        schedule.init_at(civil(2026, 8, 7, 9, 0, 0)).unwrap();

        assert_eq!(forward(&mut schedule), civil(2026, 8, 8, 9, 0, 0));
    }

    #[test]
    fn positions_within_sparse_rings() {
        let spec = ScheduleSpec {
            seconds: Selector::list([0]),
            minutes: Selector::list([0]),
            hours: Selector::list([9, 15]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        schedule.init_at(civil(2026, 8, 7, 12, 30, 45)).unwrap();

        assert_eq!(forward(&mut schedule), civil(2026, 8, 7, 15, 0, 0));
        assert_eq!(forward(&mut schedule), civil(2026, 8, 8, 9, 0, 0));
    }

    #[test]
    fn a_passed_hour_rolls_to_the_next_day() {
        let spec = ScheduleSpec {
            seconds: Selector::list([0]),
            minutes: Selector::list([0]),
            hours: Selector::list([9]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        schedule.init_at(civil(2026, 8, 7, 12, 30, 45)).unwrap();

        assert_eq!(forward(&mut schedule), civil(2026, 8, 8, 9, 0, 0));
    }

    #[test_log::test]
    fn weekday_filter_lands_on_the_next_monday_at_midnight() {
        let spec = ScheduleSpec {
            weekdays: Selector::weekdays([chrono::Weekday::Mon]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        // 2026-08-05 is a Wednesday; 2026-08-10 the following Monday
        schedule.init_at(civil(2026, 8, 5, 12, 34, 56)).unwrap();

        assert_eq!(forward(&mut schedule), civil(2026, 8, 10, 0, 0, 0));
        assert_eq!(forward(&mut schedule), civil(2026, 8, 10, 0, 0, 1));
    }

    #[test]
    fn a_reference_on_an_admitted_weekday_keeps_its_day() {
        let spec = ScheduleSpec {
            weekdays: Selector::weekdays([chrono::Weekday::Wed]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        schedule.init_at(civil(2026, 8, 5, 12, 34, 56)).unwrap();

        assert_eq!(forward(&mut schedule), civil(2026, 8, 5, 12, 34, 57));
    }

    #[test]
    fn day_31_skips_short_months() {
        let spec = ScheduleSpec {
            seconds: Selector::list([0]),
            minutes: Selector::list([0]),
            hours: Selector::list([0]),
            days: Selector::list([31]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        schedule.init_at(civil(2026, 1, 15, 10, 0, 0)).unwrap();

        // February, April and June have no day 31 and are never composed
        assert_eq!(forward(&mut schedule), civil(2026, 1, 31, 0, 0, 0));
        assert_eq!(forward(&mut schedule), civil(2026, 3, 31, 0, 0, 0));
        assert_eq!(forward(&mut schedule), civil(2026, 5, 31, 0, 0, 0));
        assert_eq!(forward(&mut schedule), civil(2026, 7, 31, 0, 0, 0));
    }

    #[test]
    fn leap_day_waits_for_a_leap_year() {
        let spec = ScheduleSpec {
            seconds: Selector::list([0]),
            minutes: Selector::list([0]),
            hours: Selector::list([0]),
            days: Selector::list([29]),
            months: Selector::list([2]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        schedule.init_at(civil(2026, 1, 1, 0, 0, 0)).unwrap();

        assert_eq!(forward(&mut schedule), civil(2028, 2, 29, 0, 0, 0));
        assert_eq!(forward(&mut schedule), civil(2032, 2, 29, 0, 0, 0));
    }

    #[test]
    fn combined_day_and_weekday_filters() {
        let spec = ScheduleSpec {
            seconds: Selector::list([0]),
            minutes: Selector::list([0]),
            hours: Selector::list([0]),
            days: Selector::list([31]),
            weekdays: Selector::weekdays([chrono::Weekday::Sat]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        schedule.init_at(civil(2026, 1, 15, 0, 0, 0)).unwrap();

        // The only Saturday-the-31sts of 2026 are in January and October
        assert_eq!(forward(&mut schedule), civil(2026, 1, 31, 0, 0, 0));
        assert_eq!(forward(&mut schedule), civil(2026, 10, 31, 0, 0, 0));
    }

    #[test]
    fn passed_month_carries_into_the_next_year() {
        let spec = ScheduleSpec {
            months: Selector::list([3]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        schedule.init_at(civil(2026, 12, 15, 10, 20, 30)).unwrap();

        assert_eq!(forward(&mut schedule), civil(2027, 3, 1, 0, 0, 0));
    }

    #[test]
    fn backward_tick_undoes_forward_tick() {
        let spec = ScheduleSpec {
            seconds: Selector::list([0]),
            minutes: Selector::list([0]),
            hours: Selector::list([9]),
            weekdays: Selector::weekdays([chrono::Weekday::Mon]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        schedule.init_at(civil(2026, 8, 5, 12, 0, 0)).unwrap();

        let first = forward(&mut schedule);
        let second = forward(&mut schedule);
        assert!(second > first);
        assert_eq!(backward(&mut schedule), first);
    }

    #[test]
    fn backward_walk_revisits_the_forward_instants() {
        let spec = ScheduleSpec {
            seconds: Selector::list([0]),
            minutes: Selector::list([0]),
            hours: Selector::list([0]),
            days: Selector::list([31]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        schedule.init_at(civil(2026, 1, 15, 10, 0, 0)).unwrap();

        let jan = forward(&mut schedule);
        let mar = forward(&mut schedule);
        assert_eq!(mar, civil(2026, 3, 31, 0, 0, 0));
        assert_eq!(backward(&mut schedule), jan);
        assert_eq!(backward(&mut schedule), civil(2025, 12, 31, 0, 0, 0));
    }

    #[test_log::test]
    fn every_forward_instant_is_valid_admitted_and_later() {
        let spec = ScheduleSpec {
            minutes: Selector::list([0, 30]),
            hours: Selector::list([6]),
            weekdays: Selector::weekdays([chrono::Weekday::Mon, chrono::Weekday::Wed]),
            ..utc_spec()
        };
        let mut schedule = schedule(&spec);
        schedule.init_at(civil(2026, 8, 5, 12, 0, 0)).unwrap();

        let mut previous = schedule.current().unwrap();
        for _ in 0..300 {
            let instant = schedule.tick(Direction::Forward).unwrap();
            assert!(instant > previous);
            let weekday = instant.naive_local().weekday().num_days_from_sunday();
            assert!(weekday == 1 || weekday == 3);
            previous = instant;
        }
    }

    #[test]
    fn rejects_a_day_that_fits_no_admitted_month() {
        let spec = ScheduleSpec {
            days: Selector::list([31]),
            months: Selector::list([2, 4]),
            ..utc_spec()
        };
        let err = Schedule::new(&spec).unwrap_err();
        assert!(
            matches!(err, ScheduleError::UnsatisfiableDate { day: 31, limit: 30 }),
            "got {err}"
        );
    }

    #[test]
    fn accepts_the_leap_day_schedule() {
        let spec = ScheduleSpec {
            days: Selector::list([29]),
            months: Selector::list([2]),
            ..utc_spec()
        };
        assert!(Schedule::new(&spec).is_ok());
    }

    #[test]
    fn rejects_an_empty_selector() {
        let spec = ScheduleSpec {
            hours: Selector::list([99]),
            ..utc_spec()
        };
        let err = Schedule::new(&spec).unwrap_err();
        assert!(matches!(err, ScheduleError::EmptyField(Field::Hour)));
    }

    #[test]
    fn builds_from_config() {
        use carillon_core::config::{FieldSpec, RangeSpec, ScheduleConfig};

        let config = ScheduleConfig {
            timezone: Some("Europe/Zurich".to_string()),
            minutes: FieldSpec::List { list: vec![0, 30] },
            hours: FieldSpec::Range {
                range: RangeSpec {
                    start: 8,
                    end: 18,
                    step: 1,
                },
            },
            ..ScheduleConfig::default()
        };
        let spec = ScheduleSpec::from_config(&config).unwrap();
        assert_eq!(spec.timezone, ScheduleZone::Named(Tz::Europe__Zurich));
        assert!(Schedule::new(&spec).is_ok());
    }

    #[test]
    fn config_with_unknown_timezone_fails() {
        use carillon_core::config::ScheduleConfig;

        let config = ScheduleConfig {
            timezone: Some("Atlantis/Sunken_City".to_string()),
            ..ScheduleConfig::default()
        };
        let err = ScheduleSpec::from_config(&config).unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownTimezone(_)));
    }

    #[test]
    fn config_with_empty_list_fails_validation() {
        use carillon_core::config::{FieldSpec, ScheduleConfig};

        let config = ScheduleConfig {
            minutes: FieldSpec::List { list: vec![] },
            ..ScheduleConfig::default()
        };
        let err = ScheduleSpec::from_config(&config).unwrap_err();
        assert!(matches!(err, ScheduleError::CoreError(_)));
    }
}
