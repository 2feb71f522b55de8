use chrono::TimeDelta;
use serde::Serialize;

use crate::{
    core::{
        battery::EnergyLedger,
        interval::Interval,
        route::Route,
        schedule::Schedule,
        vehicle::Vehicle,
        weather::WeatherSource,
    },
    fmt::FormattedPercentage,
    prelude::*,
    quantity::{
        energy::WattHours,
        mechanics::{Metres, MetresPerSecond},
        time::Seconds,
    },
};

/// Duration of a mandatory control stop, unless the race window ends earlier.
pub const CONTROL_STOP_DURATION: TimeDelta = TimeDelta::minutes(30);

/// Static charging integrates the solar power over slices of this duration.
pub const CHARGING_SLICE: TimeDelta = TimeDelta::minutes(5);

/// Upper bound on the driving steps of a single run to catch degenerate inputs.
pub const MAX_STEPS: usize = 1_000_000;

/// Single race run outcome at a constant speed.
#[must_use]
#[derive(Clone, Debug)]
pub enum Outcome {
    Finished(Finish),
    DidNotFinish(Retirement),
}

impl Outcome {
    #[must_use]
    pub const fn race_time(&self) -> Option<Seconds> {
        match self {
            Self::Finished(finish) => Some(finish.race_time),
            Self::DidNotFinish(_) => None,
        }
    }
}

#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct Finish {
    /// Total race time with the days aligned to the wall clock.
    pub race_time: Seconds,

    pub days: Vec<DaySummary>,
}

#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct DaySummary {
    pub day: usize,

    /// Distance from the start at the end of the day.
    pub distance: Metres,

    pub energy_at_race_start: WattHours,
    pub energy_at_race_end: WattHours,

    /// Energy after the evening charging, or at the finish line on the last day.
    pub energy_at_day_end: WattHours,

    pub n_control_stops: usize,
}

#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct Retirement {
    pub reason: RetirementReason,
    pub day: usize,

    /// Distance from the start at the moment of retirement.
    pub distance: Metres,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum RetirementReason {
    #[display("the battery cannot deliver the demanded power")]
    Infeasible,

    #[display("the battery is depleted")]
    Depleted,

    #[display("the race days are over")]
    OutOfDays,
}

/// Time-stepped energy balance of a solar car driving the route at a constant speed.
///
/// The runner is stateless: every [`RaceRunner::run`] allocates its own [`EnergyLedger`],
/// so runs may be evaluated in parallel.
#[derive(bon::Builder)]
pub struct RaceRunner<'a, W> {
    vehicle: &'a Vehicle,
    route: &'a Route,
    weather: &'a W,
    schedule: &'a Schedule,
}

impl<W: WeatherSource> RaceRunner<'_, W> {
    /// Race the whole route at the constant speed.
    ///
    /// # Errors
    ///
    /// Non-positive speed or exceeding [`MAX_STEPS`]. Not finishing the race is not an error.
    #[instrument(skip_all, fields(speed = %speed))]
    #[expect(clippy::cast_precision_loss)]
    pub fn run(&self, speed: MetresPerSecond) -> Result<Outcome> {
        ensure!(
            speed > MetresPerSecond::ZERO && speed.0.is_finite(),
            "speed must be positive, got {speed}",
        );

        let battery = &self.vehicle.battery;
        let total_distance = self.route.total_distance();
        let mut ledger = EnergyLedger::full(battery);
        let mut distance = Metres::ZERO;
        let mut n_steps = 0;
        let mut days = Vec::with_capacity(self.schedule.n_days());

        for (day, schedule) in self.schedule.iter() {
            // Days are aligned to the wall clock, not to the accumulated driving time:
            let mut elapsed = Seconds::DAY * day as f64;

            if day != 0 {
                let gain = self.static_charging_gain(distance, schedule.morning_charge);
                ledger.charge(gain, battery.capacity);
            }
            let energy_at_race_start = ledger.energy_remaining();

            let mut clock = schedule.morning_charge.end.max(schedule.race.start);
            let mut n_control_stops = 0;

            while distance < total_distance && clock < schedule.race.end {
                n_steps += 1;
                ensure!(n_steps <= MAX_STEPS, "exceeded {MAX_STEPS} steps at {distance}");

                let segment = self.route.segment_at(distance);
                let time_left = Seconds::from(schedule.race.end - clock);
                let segment_end = self.route.segment_end_at(distance);
                let reaches_race_end = distance + speed * time_left < segment_end;
                let (target, step_time) = if reaches_race_end {
                    (distance + speed * time_left, time_left)
                } else {
                    (segment_end, (segment_end - distance) / speed)
                };

                let weather = self.weather.sample(segment.weather_station, clock);
                let power_out = self.vehicle.resistive_force(speed, segment, &weather) * speed;
                let power_in = self.vehicle.solar_power(weather.irradiance);
                let net_power = power_in - power_out;
                let state_of_charge = battery.state_of_charge(ledger.energy_remaining());

                let Some(loss) = battery.power_loss(net_power, state_of_charge) else {
                    return Ok(Self::retire(RetirementReason::Infeasible, day, distance));
                };
                ledger.apply((net_power - loss) * step_time);
                trace!(
                    %distance,
                    %net_power,
                    %loss,
                    energy = %ledger.energy_remaining(),
                    "step",
                );
                if ledger.is_depleted() {
                    return Ok(Self::retire(RetirementReason::Depleted, day, distance));
                }

                let previous_distance = distance;
                distance = target;
                elapsed += step_time;
                // Snap to the race end so that the rounding to microseconds cannot stall the clock:
                clock = if reaches_race_end {
                    schedule.race.end
                } else {
                    clock + TimeDelta::from(step_time)
                };

                // Stops at the finish line do not count:
                if self.route.crosses_control_stop(previous_distance, distance)
                    && distance < total_distance
                    && clock < schedule.race.end
                {
                    let stop =
                        Interval::new(clock, (clock + CONTROL_STOP_DURATION).min(schedule.race.end));
                    ledger.charge(self.static_charging_gain(distance, stop), battery.capacity);
                    elapsed += Seconds::from(stop.duration());
                    clock = stop.end;
                    n_control_stops += 1;
                    debug!(day, %distance, energy = %ledger.energy_remaining(), "control stop");
                }
            }

            let energy_at_race_end = ledger.energy_remaining();
            if distance >= total_distance {
                days.push(DaySummary {
                    day,
                    distance,
                    energy_at_race_start,
                    energy_at_race_end,
                    energy_at_day_end: energy_at_race_end,
                    n_control_stops,
                });
                debug!(day, race_time = %elapsed, "finished");
                return Ok(Outcome::Finished(Finish { race_time: elapsed, days }));
            }

            ledger.charge(
                self.static_charging_gain(distance, schedule.evening_charge),
                battery.capacity,
            );
            days.push(DaySummary {
                day,
                distance,
                energy_at_race_start,
                energy_at_race_end,
                energy_at_day_end: ledger.energy_remaining(),
                n_control_stops,
            });
            debug!(
                day,
                %distance,
                state_of_charge = %FormattedPercentage(battery.state_of_charge(ledger.energy_remaining())),
                "day is over",
            );
        }

        Ok(Self::retire(
            RetirementReason::OutOfDays,
            self.schedule.n_days().saturating_sub(1),
            distance,
        ))
    }

    /// Solar energy collected while standing at the distance during the interval.
    fn static_charging_gain(&self, distance: Metres, interval: Interval) -> WattHours {
        let station = self.route.segment_at(distance).weather_station;
        interval
            .slices(CHARGING_SLICE)
            .map(|slice| {
                let irradiance = self.weather.sample(station, slice.start).irradiance;
                self.vehicle.solar_power(irradiance) * Seconds::from(slice.duration())
            })
            .sum()
    }

    fn retire(reason: RetirementReason, day: usize, distance: Metres) -> Outcome {
        debug!(%reason, day, %distance, "did not finish");
        Outcome::DidNotFinish(Retirement { reason, day, distance })
    }
}
