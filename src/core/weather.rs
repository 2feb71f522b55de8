use std::{collections::BTreeMap, fs::File, io::Read, path::Path};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Deserialize;

use crate::{
    prelude::*,
    quantity::{
        mechanics::{KilogramsPerCubicMetre, MetresPerSecond},
        power::Irradiance,
    },
};

/// Source of the weather conditions along the route.
///
/// Implementations must answer for any time, including those outside of their data range.
pub trait WeatherSource: Sync {
    fn sample(&self, station: usize, time: DateTime<Utc>) -> WeatherSample;
}

/// Air velocity over the ground.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Wind {
    /// Eastward component.
    pub east: MetresPerSecond,

    /// Northward component.
    pub north: MetresPerSecond,
}

impl Wind {
    /// Convert from the meteorological convention: the direction is where the wind blows **from**,
    /// in degrees clockwise from north.
    pub fn from_meteorological(speed: MetresPerSecond, from_degrees: f64) -> Self {
        let (sin, cos) = from_degrees.to_radians().sin_cos();
        Self { east: -speed * sin, north: -speed * cos }
    }

    /// Wind component along the heading (radians clockwise from north); positive is a tailwind.
    pub fn along(self, heading: f64) -> MetresPerSecond {
        let (sin, cos) = heading.sin_cos();
        self.east * sin + self.north * cos
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WeatherSample {
    pub irradiance: Irradiance,
    pub wind: Wind,
    pub air_density: KilogramsPerCubicMetre,
}

impl WeatherSample {
    /// Linear interpolation towards `other`, where `ratio` is in `0.0..=1.0`.
    fn lerp(self, other: Self, ratio: f64) -> Self {
        Self {
            irradiance: self.irradiance + (other.irradiance - self.irradiance) * ratio,
            wind: Wind {
                east: self.wind.east + (other.wind.east - self.wind.east) * ratio,
                north: self.wind.north + (other.wind.north - self.wind.north) * ratio,
            },
            air_density: self.air_density + (other.air_density - self.air_density) * ratio,
        }
    }
}

/// Weather CSV row.
#[derive(Deserialize)]
struct Record {
    station: usize,

    /// Unix timestamp in seconds.
    timestamp: i64,

    #[serde(rename = "irradiance")]
    irradiance_watts_per_square_metre: f64,

    #[serde(rename = "wind_speed")]
    wind_speed_metres_per_second: f64,

    #[serde(rename = "wind_direction")]
    wind_direction_degrees: f64,

    #[serde(rename = "air_density")]
    air_density_kilograms_per_cubic_metre: f64,
}

/// Time series of the weather stations, linearly interpolated in time.
#[must_use]
pub struct WeatherStations {
    /// Indexed by the station number, each one sorted by time.
    stations: Vec<Vec<(DateTime<Utc>, WeatherSample)>>,
}

impl WeatherStations {
    pub fn try_new(
        samples: impl IntoIterator<Item = (usize, DateTime<Utc>, WeatherSample)>,
    ) -> Result<Self> {
        let mut by_station = BTreeMap::<usize, Vec<(DateTime<Utc>, WeatherSample)>>::new();
        for (station, time, sample) in samples {
            by_station.entry(station).or_default().push((time, sample));
        }
        ensure!(!by_station.is_empty(), "there are no weather samples");

        let mut stations = Vec::with_capacity(by_station.len());
        for (expected_station, (station, mut series)) in by_station.into_iter().enumerate() {
            ensure!(
                station == expected_station,
                "weather station #{expected_station} has no samples",
            );
            series.sort_unstable_by_key(|(time, _)| *time);
            if let Some(((time, _), _)) =
                series.iter().tuple_windows().find(|(left, right)| left.0 == right.0)
            {
                bail!("weather station #{station} has duplicate samples at {time}");
            }
            stations.push(series);
        }
        Ok(Self { stations })
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
        Self::from_reader(file).with_context(|| format!("failed to load `{}`", path.display()))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let samples = csv::Reader::from_reader(reader)
            .deserialize()
            .map(|record| -> Result<_> {
                let record: Record = record?;
                let time = DateTime::from_timestamp(record.timestamp, 0)
                    .with_context(|| format!("timestamp is out of range: {}", record.timestamp))?;
                let sample = WeatherSample {
                    irradiance: Irradiance(record.irradiance_watts_per_square_metre),
                    wind: Wind::from_meteorological(
                        MetresPerSecond(record.wind_speed_metres_per_second),
                        record.wind_direction_degrees,
                    ),
                    air_density: KilogramsPerCubicMetre(
                        record.air_density_kilograms_per_cubic_metre,
                    ),
                };
                Ok((record.station, time, sample))
            })
            .collect::<Result<Vec<_>>>()?;
        let n_samples = samples.len();
        let this = Self::try_new(samples)?;
        info!(n_samples, n_stations = this.n_stations(), "loaded the weather");
        Ok(this)
    }

    #[must_use]
    pub const fn n_stations(&self) -> usize {
        self.stations.len()
    }
}

impl WeatherSource for WeatherStations {
    /// Interpolate the station series at the time.
    ///
    /// Out-of-range stations fall back to the last one, and the edge samples hold outside the series.
    fn sample(&self, station: usize, time: DateTime<Utc>) -> WeatherSample {
        let series = &self.stations[station.min(self.stations.len() - 1)];
        let index = series.partition_point(|(sample_time, _)| *sample_time <= time);
        match (index.checked_sub(1).map(|index| series[index]), series.get(index).copied()) {
            (Some((left_time, left)), Some((right_time, right))) => {
                let ratio = (time - left_time).as_seconds_f64()
                    / (right_time - left_time).as_seconds_f64();
                left.lerp(right, ratio)
            }
            (Some((_, sample)), None) | (None, Some((_, sample))) => sample,
            (None, None) => unreachable!("every station has at least one sample"),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const CSV: &str = "\
station,timestamp,irradiance,wind_speed,wind_direction,air_density
0,1000,200,0,0,1.2
0,0,0,0,0,1.0
1,500,800,10,270,1.1
";

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    #[test]
    fn interpolates_between_samples() {
        let weather = WeatherStations::from_reader(CSV.as_bytes()).unwrap();
        let sample = weather.sample(0, at(250));
        assert_abs_diff_eq!(sample.irradiance.0, 50.0);
        assert_abs_diff_eq!(sample.air_density.0, 1.05);
    }

    #[test]
    fn holds_edge_samples() {
        let weather = WeatherStations::from_reader(CSV.as_bytes()).unwrap();
        assert_abs_diff_eq!(weather.sample(0, at(-100)).irradiance.0, 0.0);
        assert_abs_diff_eq!(weather.sample(0, at(5000)).irradiance.0, 200.0);
        assert_abs_diff_eq!(weather.sample(0, at(1000)).irradiance.0, 200.0);
    }

    #[test]
    fn clamps_station_index() {
        let weather = WeatherStations::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(weather.n_stations(), 2);
        assert_abs_diff_eq!(weather.sample(7, at(0)).irradiance.0, 800.0);
    }

    #[test]
    fn westerly_wind_blows_east() {
        let weather = WeatherStations::from_reader(CSV.as_bytes()).unwrap();
        let wind = weather.sample(1, at(0)).wind;
        assert_abs_diff_eq!(wind.east.0, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(wind.north.0, 0.0, epsilon = 1e-9);
        // Tailwind while heading east, headwind while heading west:
        assert_abs_diff_eq!(wind.along(90_f64.to_radians()).0, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(wind.along(270_f64.to_radians()).0, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn missing_station() {
        let csv = "station,timestamp,irradiance,wind_speed,wind_direction,air_density\n\
                   1,0,0,0,0,1.2\n";
        assert!(WeatherStations::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn duplicate_timestamps() {
        let csv = "station,timestamp,irradiance,wind_speed,wind_direction,air_density\n\
                   0,0,0,0,0,1.2\n\
                   0,0,1,0,0,1.2\n";
        assert!(WeatherStations::from_reader(csv.as_bytes()).is_err());
    }
}
