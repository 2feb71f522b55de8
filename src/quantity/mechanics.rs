use std::ops::{Div, Mul};

use crate::quantity::{power::Watts, time::Seconds};

quantity!(Kilograms, suffix: "kg", precision: 1);
quantity!(Newtons, suffix: "N", precision: 1);
quantity!(Metres, suffix: "m", precision: 0);
quantity!(MetresPerSecond, suffix: "m/s", precision: 2);
quantity!(SquareMetres, suffix: "m²", precision: 3);
quantity!(KilogramsPerCubicMetre, suffix: "kg/m³", precision: 3);

/// Standard gravity, m/s².
pub const STANDARD_GRAVITY: f64 = 9.81;

impl Metres {
    pub const fn as_kilometres(self) -> f64 {
        self.0 / 1000.0
    }
}

impl MetresPerSecond {
    pub const fn as_kilometres_per_hour(self) -> f64 {
        self.0 * 3.6
    }
}

impl Kilograms {
    /// Weight of the mass at the standard gravity.
    pub const fn weight(self) -> Newtons {
        Newtons(self.0 * STANDARD_GRAVITY)
    }
}

impl Mul<MetresPerSecond> for Newtons {
    type Output = Watts;

    fn mul(self, speed: MetresPerSecond) -> Self::Output {
        Watts(self.0 * speed.0)
    }
}

impl Mul<Seconds> for MetresPerSecond {
    type Output = Metres;

    fn mul(self, time: Seconds) -> Self::Output {
        Metres(self.0 * time.0)
    }
}

impl Div<MetresPerSecond> for Metres {
    type Output = Seconds;

    fn div(self, speed: MetresPerSecond) -> Self::Output {
        Seconds(self.0 / speed.0)
    }
}
