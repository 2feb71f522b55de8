use std::{fs, path::Path};

use serde::Deserialize;

use crate::{
    core::{
        optimizer::{SpeedDomain, StrategyName},
        schedule::Schedule,
        vehicle::Vehicle,
    },
    prelude::*,
};

/// Race file: the car, the daily schedule, and the optimizer settings.
#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub vehicle: Vehicle,
    pub days: Schedule,

    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

#[must_use]
#[derive(Copy, Clone, Debug, Default, Deserialize)]
pub struct OptimizerConfig {
    #[serde(flatten)]
    pub domain: SpeedDomain,

    /// Used unless overridden on the command line.
    #[serde(default)]
    pub strategy: StrategyName,
}

impl Config {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let this = Self::from_toml(&text)
            .with_context(|| format!("invalid race file `{}`", path.display()))?;
        info!(n_days = this.days.n_days(), "loaded");
        Ok(this)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let this: Self = toml::from_str(text)?;
        this.validate()?;
        Ok(this)
    }

    pub fn validate(&self) -> Result {
        self.vehicle.validate().context("invalid vehicle")?;
        self.days.validate().context("invalid schedule")?;
        self.optimizer.domain.validate().context("invalid speed domain")
    }
}
