use std::ops::Mul;

use crate::quantity::{energy::WattHours, mechanics::SquareMetres, time::Seconds};

quantity!(Watts, suffix: "W", precision: 0);

quantity!(
    /// Solar irradiance in watts per square metre.
    Irradiance,
    suffix: "W/m²",
    precision: 0
);

impl Mul<Seconds> for Watts {
    type Output = WattHours;

    fn mul(self, seconds: Seconds) -> Self::Output {
        WattHours(self.0 * seconds.0 / 3600.0)
    }
}

impl Mul<SquareMetres> for Irradiance {
    type Output = Watts;

    fn mul(self, area: SquareMetres) -> Self::Output {
        Watts(self.0 * area.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_over_an_hour() {
        assert_eq!(Watts(500.0) * Seconds(7200.0), WattHours(1000.0));
    }

    #[test]
    fn irradiance_over_area() {
        assert_eq!(Irradiance(1000.0) * SquareMetres(4.0), Watts(4000.0));
    }
}
