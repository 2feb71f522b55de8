mod ledger;

use serde::Deserialize;

pub use self::ledger::EnergyLedger;
use crate::{
    prelude::*,
    quantity::{
        electric::{Ohms, Volts},
        energy::WattHours,
        power::Watts,
    },
};

/// Battery pack modelled as an ideal voltage source behind an internal resistance.
///
/// The open-circuit voltage is linear in the state of charge. The model has no state:
/// the stored energy lives in [`EnergyLedger`].
#[must_use]
#[derive(Copy, Clone, Debug, Deserialize, bon::Builder)]
pub struct Battery {
    /// Usable energy capacity.
    #[serde(rename = "capacity_watt_hours")]
    pub capacity: WattHours,

    #[serde(rename = "internal_resistance_ohms")]
    pub internal_resistance: Ohms,

    /// Terminal voltage of an empty pack.
    #[serde(rename = "min_voltage_volts")]
    pub min_voltage: Volts,

    /// Terminal voltage of a full pack.
    #[serde(rename = "max_voltage_volts")]
    pub max_voltage: Volts,
}

impl Battery {
    pub fn validate(&self) -> Result {
        ensure!(
            self.capacity > WattHours::ZERO && self.capacity.0.is_finite(),
            "battery capacity must be positive, got {}",
            self.capacity,
        );
        ensure!(
            self.internal_resistance >= Ohms::ZERO && self.internal_resistance.0.is_finite(),
            "internal resistance must be non-negative, got {}",
            self.internal_resistance,
        );
        ensure!(
            self.min_voltage.0.is_finite() && self.max_voltage.0.is_finite(),
            "battery voltages must be finite",
        );
        ensure!(
            self.max_voltage >= self.min_voltage,
            "maximum voltage ({}) is below the minimum voltage ({})",
            self.max_voltage,
            self.min_voltage,
        );
        Ok(())
    }

    /// Fraction of the capacity stored. Not clamped: values outside `0.0..=1.0` are for the caller to judge.
    #[must_use]
    pub fn state_of_charge(&self, energy_remaining: WattHours) -> f64 {
        energy_remaining / self.capacity
    }

    pub fn voltage(&self, state_of_charge: f64) -> Volts {
        self.min_voltage + (self.max_voltage - self.min_voltage) * state_of_charge
    }

    /// Resistive loss inside the pack for the given net power flowing into it.
    ///
    /// Positive `net_power` charges the pack, negative drains it. The current solves
    /// `R·I² + V·I − P = 0`, and the loss is `I²·R`.
    ///
    /// # Returns
    ///
    /// [`None`] if no current can deliver the requested power, that is the discharge demand
    /// exceeds `V²/(4R)` at this state of charge.
    #[must_use]
    pub fn power_loss(&self, net_power: Watts, state_of_charge: f64) -> Option<Watts> {
        let voltage = self.voltage(state_of_charge).0;
        let resistance = self.internal_resistance.0;
        if resistance == 0.0 {
            // Ideal source:
            return Some(Watts::ZERO);
        }
        let discriminant = voltage.mul_add(voltage, 4.0 * resistance * net_power.0);
        if discriminant < 0.0 {
            return None;
        }
        let current = (discriminant.sqrt() - voltage) / (2.0 * resistance);
        Some(Watts(current * current * resistance))
    }
}
