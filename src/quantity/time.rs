use chrono::TimeDelta;

quantity!(Seconds, suffix: "s", precision: 0);

impl Seconds {
    pub const DAY: Self = Self(86400.0);

    pub const fn as_hours(self) -> f64 {
        self.0 / 3600.0
    }
}

impl From<TimeDelta> for Seconds {
    fn from(time_delta: TimeDelta) -> Self {
        Self(time_delta.as_seconds_f64())
    }
}

impl From<Seconds> for TimeDelta {
    /// Round to the nearest microsecond.
    #[expect(clippy::cast_possible_truncation)]
    fn from(seconds: Seconds) -> Self {
        Self::microseconds((seconds.0 * 1_000_000.0).round() as i64)
    }
}
