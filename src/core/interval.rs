use std::{
    fmt::{Debug, Formatter},
    iter,
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_with::{TimestampSeconds, serde_as};

/// Time window, configured with Unix timestamps in seconds.
#[serde_as]
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq, Deserialize)]
pub struct Interval {
    /// Inclusive.
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub start: DateTime<Utc>,

    /// Exclusive.
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub end: DateTime<Utc>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Duration of the interval, zero if it is inverted.
    #[must_use]
    pub fn duration(self) -> TimeDelta {
        (self.end - self.start).max(TimeDelta::zero())
    }

    /// Split the interval into consecutive slices of at most `step` long.
    ///
    /// The last slice is shorter if the duration is not a multiple of the step.
    pub fn slices(self, step: TimeDelta) -> impl Iterator<Item = Self> {
        debug_assert!(step > TimeDelta::zero());
        iter::successors(Some(self.start).filter(|start| *start < self.end), move |start| {
            Some(*start + step).filter(|next| *next < self.end)
        })
        .map(move |start| Self::new(start, (start + step).min(self.end)))
    }
}
