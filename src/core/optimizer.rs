//! Cruising speed search over the race runner viewed as a black box.

mod binary;
mod linear;

use serde::{Deserialize, Serialize};

pub use self::{binary::BinarySearch, linear::LinearScan};
use crate::{
    core::{runner::RaceRunner, weather::WeatherSource},
    prelude::*,
    quantity::{mechanics::MetresPerSecond, time::Seconds},
};

/// Speed to race time mapping, [`None`] meaning the car does not finish.
pub trait Oracle: Sync {
    fn race_time(&self, speed: MetresPerSecond) -> Result<Option<Seconds>>;
}

impl<F> Oracle for F
where
    F: Fn(MetresPerSecond) -> Result<Option<Seconds>> + Sync,
{
    fn race_time(&self, speed: MetresPerSecond) -> Result<Option<Seconds>> {
        self(speed)
    }
}

impl<W: WeatherSource> Oracle for RaceRunner<'_, W> {
    fn race_time(&self, speed: MetresPerSecond) -> Result<Option<Seconds>> {
        Ok(self.run(speed)?.race_time())
    }
}

/// Search strategy for the fastest feasible cruising speed.
pub trait Optimizer {
    /// # Returns
    ///
    /// [`None`] when none of the tried speeds finishes the race.
    fn optimize(&self, oracle: &dyn Oracle) -> Result<Option<Optimum>>;
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Optimum {
    pub speed: MetresPerSecond,
    pub race_time: Seconds,
}

/// Bounded search domain.
#[must_use]
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct SpeedDomain {
    #[serde(rename = "min_speed_metres_per_second", default = "SpeedDomain::default_min")]
    pub min: MetresPerSecond,

    #[serde(rename = "max_speed_metres_per_second", default = "SpeedDomain::default_max")]
    pub max: MetresPerSecond,

    /// Grid step of the linear scan and the final bracket width of the binary search.
    #[serde(rename = "precision_metres_per_second", default = "SpeedDomain::default_precision")]
    pub precision: MetresPerSecond,
}

impl Default for SpeedDomain {
    fn default() -> Self {
        Self {
            min: Self::default_min(),
            max: Self::default_max(),
            precision: Self::default_precision(),
        }
    }
}

impl SpeedDomain {
    const fn default_min() -> MetresPerSecond {
        MetresPerSecond(5.0)
    }

    const fn default_max() -> MetresPerSecond {
        MetresPerSecond(50.0)
    }

    const fn default_precision() -> MetresPerSecond {
        MetresPerSecond(0.1)
    }

    pub fn validate(&self) -> Result {
        ensure!(
            self.min > MetresPerSecond::ZERO,
            "minimum speed must be positive, got {}",
            self.min,
        );
        ensure!(
            self.max >= self.min && self.max.0.is_finite(),
            "maximum speed ({}) must not be below the minimum speed ({})",
            self.max,
            self.min,
        );
        ensure!(
            self.precision > MetresPerSecond::ZERO,
            "precision must be positive, got {}",
            self.precision,
        );
        Ok(())
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    clap::ValueEnum,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum StrategyName {
    /// Try every speed on the grid.
    #[default]
    #[display("linear")]
    Linear,

    /// Bisect the feasibility boundary assuming that faster is better until the battery gives up.
    #[display("binary")]
    Binary,
}

impl StrategyName {
    #[must_use]
    pub fn into_optimizer(self, domain: SpeedDomain) -> Box<dyn Optimizer> {
        match self {
            Self::Linear => Box::new(LinearScan::new(domain)),
            Self::Binary => Box::new(BinarySearch::new(domain)),
        }
    }
}
