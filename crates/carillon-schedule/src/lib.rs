//! Carillon scheduler - the schedule engine.
//!
//! A schedule is six admissible-value rings (second, minute, hour,
//! day-of-month, month, weekday) plus a free-running year. Ticking rotates
//! the finest ring and propagates wraps to coarser rings as carries,
//! skipping composed dates that do not exist in the calendar and dates
//! whose weekday is not admitted. The same routine walks the schedule
//! forward and backward.
//!
//! ```rust
//! use carillon_schedule::{Direction, Schedule, ScheduleSpec, Selector};
//! use chrono::NaiveDate;
//!
//! let spec = ScheduleSpec {
//!     minutes: Selector::list([0, 30]),
//!     ..ScheduleSpec::default()
//! };
//! let mut schedule = Schedule::new(&spec).unwrap();
//!
//! let reference = NaiveDate::from_ymd_opt(2026, 8, 7)
//!     .unwrap()
//!     .and_hms_opt(9, 10, 11)
//!     .unwrap();
//! schedule.init_at(reference).unwrap();
//!
//! let first = schedule.tick(Direction::Forward).unwrap();
//! assert_eq!(first.naive_local().to_string(), "2026-08-07 09:30:00");
//! ```

pub mod error;
pub mod field;
pub mod ring;
pub mod schedule;
pub mod selector;
pub mod zone;

pub use error::{ScheduleError, ScheduleResult};
pub use field::Field;
pub use ring::{Direction, FieldRing};
pub use schedule::{Schedule, ScheduleSpec};
pub use selector::Selector;
pub use zone::ScheduleZone;
