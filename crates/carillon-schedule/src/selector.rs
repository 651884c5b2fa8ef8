//! Per-unit admissibility predicates.
//!
//! A selector answers "is this value admitted?" for one calendar unit. Ring
//! construction evaluates it over the unit's domain once; the engine never
//! calls it during ticking.

use std::collections::HashSet;
use std::fmt;

use carillon_core::config::{FieldSpec, SpecKeyword};
use chrono::Weekday;

/// A boolean admissibility predicate over one unit's integer domain.
pub struct Selector(Box<dyn Fn(u32) -> bool + Send + Sync>);

impl Selector {
    /// Admits every value in the domain.
    #[must_use]
    pub fn all() -> Self {
        Self(Box::new(|_| true))
    }

    /// Admits values in `[start, end)` that are a whole number of `step`s
    /// above `start`. A zero step admits nothing.
    #[must_use]
    pub fn step_range(start: u32, end: u32, step: u32) -> Self {
        Self(Box::new(move |value| {
            value >= start && value < end && step != 0 && (value - start).is_multiple_of(step)
        }))
    }

    /// Admits an explicit enumerated set.
    #[must_use]
    pub fn list(values: impl IntoIterator<Item = u32>) -> Self {
        let admitted: HashSet<u32> = values.into_iter().collect();
        Self(Box::new(move |value| admitted.contains(&value)))
    }

    /// Admits an explicit set of weekdays, numbered days-from-Sunday.
    #[must_use]
    pub fn weekdays(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self::list(days.into_iter().map(|day| day.num_days_from_sunday()))
    }

    /// Wraps an arbitrary predicate.
    #[must_use]
    pub fn from_fn(predicate: impl Fn(u32) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(predicate))
    }

    /// Builds the selector described by a configuration field spec.
    ///
    /// The spec is assumed validated; a malformed spec still degrades to an
    /// empty admissible set, which ring construction rejects.
    #[must_use]
    pub fn from_spec(spec: &FieldSpec) -> Self {
        match spec {
            FieldSpec::Keyword(SpecKeyword::All) => Self::all(),
            FieldSpec::List { list } => Self::list(list.iter().copied()),
            FieldSpec::Range { range } => Self::step_range(range.start, range.end, range.step),
        }
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn admits(&self, value: u32) -> bool {
        (self.0)(value)
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Selector")
    }
}
