use serde::Deserialize;

use crate::{
    core::{battery::Battery, route::Segment, weather::WeatherSample},
    prelude::*,
    quantity::{
        mechanics::{Kilograms, KilogramsPerCubicMetre, MetresPerSecond, Newtons, SquareMetres},
        power::{Irradiance, Watts},
    },
};

/// Solar car performance model: closed-form road load and the solar array output.
#[must_use]
#[derive(Clone, Debug, Deserialize, bon::Builder)]
pub struct Vehicle {
    /// Total mass including the driver.
    #[serde(rename = "mass_kilograms")]
    pub mass: Kilograms,

    /// Drag coefficient times the frontal area.
    #[serde(rename = "drag_area_square_metres")]
    pub drag_area: SquareMetres,

    /// Speed-independent rolling resistance coefficient.
    pub rolling_resistance: f64,

    /// Speed-dependent rolling resistance coefficient, in seconds per metre.
    #[serde(default)]
    #[builder(default)]
    pub dynamic_rolling_resistance: f64,

    #[serde(rename = "array_area_square_metres")]
    pub array_area: SquareMetres,

    /// Fraction of the irradiance converted to electrical power.
    pub array_efficiency: f64,

    pub battery: Battery,
}

impl Vehicle {
    pub fn validate(&self) -> Result {
        ensure!(self.mass > Kilograms::ZERO, "vehicle mass must be positive, got {}", self.mass);
        ensure!(self.drag_area >= SquareMetres::ZERO, "drag area must be non-negative");
        ensure!(self.array_area >= SquareMetres::ZERO, "array area must be non-negative");
        ensure!(
            self.rolling_resistance >= 0.0 && self.dynamic_rolling_resistance >= 0.0,
            "rolling resistance coefficients must be non-negative",
        );
        ensure!(
            (0.0..=1.0).contains(&self.array_efficiency),
            "array efficiency must be within 0..=1, got {}",
            self.array_efficiency,
        );
        self.battery.validate().context("invalid battery")
    }

    /// Road reaction force on the given incline (radians).
    pub fn normal_force(&self, incline: f64) -> Newtons {
        self.mass.weight() * incline.cos()
    }

    /// Gravity component along the road, positive uphill.
    pub fn gravity_force(&self, incline: f64) -> Newtons {
        self.mass.weight() * incline.sin()
    }

    pub fn rolling_resistance(&self, normal_force: Newtons, speed: MetresPerSecond) -> Newtons {
        normal_force * self.dynamic_rolling_resistance.mul_add(speed.0, self.rolling_resistance)
    }

    /// Aerodynamic drag for the air speed relative to the car, positive for a headwind.
    ///
    /// The sign follows the air speed, so a strong tailwind pushes the car.
    pub fn drag(
        &self,
        apparent_air_speed: MetresPerSecond,
        air_density: KilogramsPerCubicMetre,
    ) -> Newtons {
        Newtons(
            0.5 * air_density.0 * self.drag_area.0 * apparent_air_speed.0 * apparent_air_speed.0.abs(),
        )
    }

    /// Total force to overcome while cruising over the segment.
    pub fn resistive_force(
        &self,
        speed: MetresPerSecond,
        segment: &Segment,
        weather: &WeatherSample,
    ) -> Newtons {
        let apparent_air_speed = speed - weather.wind.along(segment.heading);
        self.drag(apparent_air_speed, weather.air_density)
            + self.rolling_resistance(self.normal_force(segment.incline), speed)
            + self.gravity_force(segment.incline)
    }

    pub fn solar_power(&self, irradiance: Irradiance) -> Watts {
        irradiance * self.array_area * self.array_efficiency
    }
}

#[cfg(test)]
pub mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        core::weather::Wind,
        quantity::{
            electric::{Ohms, Volts},
            energy::WattHours,
            mechanics::Metres,
        },
    };

    /// Light car with a 5 kWh pack.
    pub fn vehicle() -> Vehicle {
        Vehicle::builder()
            .mass(Kilograms(300.0))
            .drag_area(SquareMetres(0.1))
            .rolling_resistance(0.005)
            .array_area(SquareMetres(4.0))
            .array_efficiency(0.25)
            .battery(
                Battery::builder()
                    .capacity(WattHours(5000.0))
                    .internal_resistance(Ohms(0.1))
                    .min_voltage(Volts(90.0))
                    .max_voltage(Volts(130.0))
                    .build(),
            )
            .build()
    }

    fn flat_segment(heading_degrees: f64) -> Segment {
        Segment {
            start: Metres::ZERO,
            heading: heading_degrees.to_radians(),
            incline: 0.0,
            weather_station: 0,
        }
    }

    fn still_air() -> WeatherSample {
        WeatherSample {
            irradiance: Irradiance(1000.0),
            wind: Wind::default(),
            air_density: KilogramsPerCubicMetre(1.2),
        }
    }

    #[test]
    fn flat_road_load() {
        let force = vehicle().resistive_force(MetresPerSecond(20.0), &flat_segment(0.0), &still_air());
        // Drag: 0.5 × 1.2 × 0.1 × 400 = 24 N, rolling: 300 × 9.81 × 0.005 = 14.715 N.
        assert_abs_diff_eq!(force.0, 38.715, epsilon = 1e-9);
    }

    #[test]
    fn headwind_increases_drag() {
        let mut weather = still_air();
        weather.wind = Wind::from_meteorological(MetresPerSecond(5.0), 0.0);
        let vehicle = vehicle();
        let north = vehicle.resistive_force(MetresPerSecond(20.0), &flat_segment(0.0), &weather);
        let south = vehicle.resistive_force(MetresPerSecond(20.0), &flat_segment(180.0), &weather);
        assert!(north > south);
        assert_abs_diff_eq!(north.0 - south.0, 0.5 * 1.2 * 0.1 * (625.0 - 225.0), epsilon = 1e-9);
    }

    #[test]
    fn strong_tailwind_pushes() {
        assert!(vehicle().drag(MetresPerSecond(-5.0), KilogramsPerCubicMetre(1.2)) < Newtons::ZERO);
    }

    #[test]
    fn gravity_on_incline() {
        let vehicle = vehicle();
        let incline = 0.1_f64.atan();
        assert_abs_diff_eq!(vehicle.gravity_force(incline).0, 2943.0 * incline.sin(), epsilon = 1e-9);
        assert!(vehicle.gravity_force(-incline) < Newtons::ZERO);
    }

    #[test]
    fn dynamic_rolling_resistance() {
        let mut vehicle = vehicle();
        vehicle.dynamic_rolling_resistance = 0.0001;
        let force = vehicle.rolling_resistance(Newtons(1000.0), MetresPerSecond(20.0));
        assert_abs_diff_eq!(force.0, 7.0, epsilon = 1e-9);
    }

    #[test]
    fn solar_power() {
        assert_abs_diff_eq!(vehicle().solar_power(Irradiance(1000.0)).0, 1000.0);
    }

    #[test]
    fn validate_ok() {
        assert!(vehicle().validate().is_ok());
    }

    #[test]
    fn validate_efficiency() {
        let mut vehicle = vehicle();
        vehicle.array_efficiency = 1.5;
        assert!(vehicle.validate().is_err());
    }
}
