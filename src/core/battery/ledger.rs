use crate::{core::battery::Battery, quantity::energy::WattHours};

/// Running total of the energy stored in the pack during a single race run.
///
/// The ledger does not enforce `0..=capacity`: driving may overcharge it, and the callers check
/// for depletion.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct EnergyLedger {
    energy_remaining: WattHours,
}

impl EnergyLedger {
    /// Start with a fully charged pack.
    pub const fn full(battery: &Battery) -> Self {
        Self { energy_remaining: battery.capacity }
    }

    pub const fn energy_remaining(&self) -> WattHours {
        self.energy_remaining
    }

    /// Apply a signed energy delta without any bounds.
    pub fn apply(&mut self, delta: WattHours) {
        self.energy_remaining += delta;
    }

    /// Add the gain and cap the result at the capacity.
    pub fn charge(&mut self, gain: WattHours, capacity: WattHours) {
        self.energy_remaining = (self.energy_remaining + gain).min(capacity);
    }

    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.energy_remaining <= WattHours::ZERO
    }
}
