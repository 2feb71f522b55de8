mod optimize;
mod simulate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use self::{
    optimize::{OptimizeArgs, optimize},
    simulate::{SimulateArgs, simulate},
};
use crate::{
    config::Config,
    core::{route::Route, weather::WeatherStations},
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Race the route at a constant cruising speed and show the daily energy balance.
    #[clap(name = "simulate")]
    Simulate(Box<SimulateArgs>),

    /// Search for the cruising speed with the shortest race time.
    #[clap(name = "optimize")]
    Optimize(Box<OptimizeArgs>),
}

#[derive(Parser)]
pub struct InputArgs {
    /// Race file with the vehicle, the daily schedule, and the optimizer settings.
    #[clap(long = "config", env = "SUNRACER_CONFIG", default_value = "race.toml")]
    pub config_path: PathBuf,

    /// Route CSV: `distance,heading,incline,weather_station,control_stop`.
    #[clap(long = "route", env = "SUNRACER_ROUTE")]
    pub route_path: PathBuf,

    /// Weather CSV: `station,timestamp,irradiance,wind_speed,wind_direction,air_density`.
    #[clap(long = "weather", env = "SUNRACER_WEATHER")]
    pub weather_path: PathBuf,
}

/// Everything a race run needs, loaded and cross-checked.
pub struct Inputs {
    pub config: Config,
    pub route: Route,
    pub weather: WeatherStations,
}

impl InputArgs {
    pub fn load(&self) -> Result<Inputs> {
        let config = Config::read_from(&self.config_path)?;
        let route = Route::read_from(&self.route_path)?;
        let weather = WeatherStations::read_from(&self.weather_path)?;
        ensure!(
            route.max_weather_station() < weather.n_stations(),
            "the route refers to weather station #{}, but there are only {} stations",
            route.max_weather_station(),
            weather.n_stations(),
        );
        Ok(Inputs { config, route, weather })
    }
}
