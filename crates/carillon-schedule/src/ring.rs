//! Rolling rings of admissible values, one per calendar unit.

use std::collections::HashMap;

use crate::error::{ScheduleError, ScheduleResult};
use crate::field::Field;
use crate::selector::Selector;

/// Rotation direction, applied uniformly to ring rotation and the year
/// counter so one carry-propagation routine serves both walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// The signed year step for a month-ring wrap in this direction.
    #[must_use]
    pub const fn year_step(self) -> i32 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

/// An ordered, deduplicated set of admissible values for one calendar unit,
/// with a current position.
///
/// `values` and `lookup` are built once at construction and never mutated;
/// only `position` changes over the ring's life.
#[derive(Debug, Clone)]
pub struct FieldRing {
    values: Vec<u32>,
    position: usize,
    lookup: HashMap<u32, usize>,
}

impl FieldRing {
    /// ## Summary
    /// Builds a ring from an explicit value list.
    ///
    /// Duplicates are collapsed and values outside the unit's domain are
    /// discarded; both are normalization, not errors.
    ///
    /// ## Errors
    /// Returns `ScheduleError::EmptyField` if no admissible value remains.
    pub fn new(field: Field, values: impl IntoIterator<Item = u32>) -> ScheduleResult<Self> {
        let (min, max) = field.domain();
        let mut values: Vec<u32> = values
            .into_iter()
            .filter(|&v| v >= min && v <= max)
            .collect();
        values.sort_unstable();
        values.dedup();

        if values.is_empty() {
            return Err(ScheduleError::EmptyField(field));
        }

        let lookup = values.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        Ok(Self {
            values,
            position: 0,
            lookup,
        })
    }

    /// ## Summary
    /// Builds a ring by scanning the unit's domain with a selector.
    ///
    /// ## Errors
    /// Returns `ScheduleError::EmptyField` if the selector admits nothing.
    pub fn from_selector(field: Field, selector: &Selector) -> ScheduleResult<Self> {
        let (min, max) = field.domain();
        Self::new(field, (min..=max).filter(|&v| selector.admits(v)))
    }

    /// ## Summary
    /// Positions the ring at `value` if admitted, else at the smallest
    /// admissible value above it.
    ///
    /// Returns `true` when no admissible value is at or above `value`: the
    /// position wraps to the first value and the caller owes a carry to the
    /// next-coarser unit.
    pub fn position_at_or_after(&mut self, value: u32) -> bool {
        if let Some(&index) = self.lookup.get(&value) {
            self.position = index;
            return false;
        }
        let index = self.values.partition_point(|&admitted| admitted < value);
        if index == self.values.len() {
            self.position = 0;
            true
        } else {
            self.position = index;
            false
        }
    }

    /// ## Summary
    /// Rotates the position one step in `direction`, wrapping at the ring
    /// ends.
    ///
    /// Returns whether the rotation wrapped (forward: back to the first
    /// value; backward: to the last). The wrap is the carry owed to the
    /// next-coarser unit. A one-element ring wraps on every rotation.
    pub fn rotate(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => {
                self.position = (self.position + 1) % self.values.len();
                self.position == 0
            }
            Direction::Backward => {
                self.position = self
                    .position
                    .checked_sub(1)
                    .unwrap_or(self.values.len() - 1);
                self.position == self.values.len() - 1
            }
        }
    }

    /// Positions the ring at its first (smallest) admissible value.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// The admissible value at the current position.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.values[self.position]
    }

    /// The smallest admissible value.
    #[must_use]
    pub fn first(&self) -> u32 {
        self.values[0]
    }

    /// Membership test against the admissible set.
    #[must_use]
    pub fn contains(&self, value: u32) -> bool {
        self.lookup.contains_key(&value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The admissible values in ascending order.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.iter().copied()
    }
}
