use itertools::Itertools;
use serde::Deserialize;

use crate::{core::interval::Interval, prelude::*};

/// Timing plan of a single race day.
#[must_use]
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct DaySchedule {
    /// Static charging before the race start. Ignored on the first day.
    pub morning_charge: Interval,

    /// Driving window.
    pub race: Interval,

    /// Static charging after the race end.
    pub evening_charge: Interval,
}

impl DaySchedule {
    pub fn validate(&self) -> Result {
        let checkpoints = [
            ("morning charge start", self.morning_charge.start),
            ("morning charge end", self.morning_charge.end),
            ("race start", self.race.start),
            ("race end", self.race.end),
            ("evening charge start", self.evening_charge.start),
            ("evening charge end", self.evening_charge.end),
        ];
        for ((earlier_name, earlier), (later_name, later)) in checkpoints.into_iter().tuple_windows()
        {
            ensure!(earlier <= later, "{earlier_name} ({earlier}) is after {later_name} ({later})");
        }
        Ok(())
    }
}

/// Multi-day race schedule, indexed by the day number.
#[must_use]
#[derive(Clone, Debug, Deserialize)]
#[serde(transparent)]
pub struct Schedule(Vec<DaySchedule>);

impl From<Vec<DaySchedule>> for Schedule {
    fn from(days: Vec<DaySchedule>) -> Self {
        Self(days)
    }
}

impl Schedule {
    #[must_use]
    pub const fn n_days(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &DaySchedule)> {
        self.0.iter().enumerate()
    }

    pub fn validate(&self) -> Result {
        ensure!(!self.0.is_empty(), "the schedule has no race days");
        for (day, schedule) in self.iter() {
            schedule.validate().with_context(|| format!("invalid schedule of day #{day}"))?;
        }
        for ((day, today), (_, tomorrow)) in self.iter().tuple_windows() {
            ensure!(
                today.evening_charge.end <= tomorrow.morning_charge.start,
                "day #{day} overlaps with the next one",
            );
        }
        Ok(())
    }
}
