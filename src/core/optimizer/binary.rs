use crate::{
    core::optimizer::{Optimizer, Optimum, Oracle, SpeedDomain},
    prelude::*,
};

/// Bisection of the feasibility boundary.
///
/// Assumes that higher speeds drain the battery faster and finish sooner, so the fastest feasible
/// speed is the best one. If the race time is not monotonic near the boundary, the result is only
/// a feasible speed, not necessarily the quickest one.
///
/// Only the midpoints are bisected. The minimum speed is tried last, when none of them is feasible.
#[must_use]
pub struct BinarySearch {
    domain: SpeedDomain,
}

impl BinarySearch {
    pub const fn new(domain: SpeedDomain) -> Self {
        Self { domain }
    }
}

impl Optimizer for BinarySearch {
    #[instrument(skip_all, fields(min = %self.domain.min, max = %self.domain.max))]
    fn optimize(&self, oracle: &dyn Oracle) -> Result<Option<Optimum>> {
        let mut low = self.domain.min;
        let mut high = self.domain.max;
        let mut best: Option<Optimum> = None;

        while high - low > self.domain.precision {
            let speed = (low + high) / 2.0;
            if let Some(race_time) = oracle.race_time(speed)? {
                debug!(%speed, %race_time, "feasible");
                if best.is_none_or(|best| race_time < best.race_time) {
                    best = Some(Optimum { speed, race_time });
                }
                low = speed;
            } else {
                debug!(%speed, "infeasible");
                high = speed;
            }
        }

        if best.is_none() {
            let speed = self.domain.min;
            best = oracle.race_time(speed)?.map(|race_time| Optimum { speed, race_time });
        }

        info!(?best, "bisected");
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::quantity::{mechanics::MetresPerSecond, time::Seconds};

    /// Feasible up to 30 m/s, faster is better.
    fn race_time(speed: MetresPerSecond) -> Option<Seconds> {
        (speed <= MetresPerSecond(30.0)).then(|| Seconds(1_000_000.0 / speed.0))
    }

    #[test]
    fn converges_to_boundary() {
        let oracle = |speed| -> Result<Option<Seconds>> { Ok(race_time(speed)) };
        let optimum = BinarySearch::new(SpeedDomain::default()).optimize(&oracle).unwrap().unwrap();
        assert!(optimum.speed <= MetresPerSecond(30.0));
        assert!(optimum.speed > MetresPerSecond(29.8));
        assert_eq!(Some(optimum.race_time), race_time(optimum.speed));
    }

    #[test]
    fn number_of_calls_is_logarithmic() {
        let n_calls = AtomicUsize::new(0);
        let oracle = |speed| -> Result<Option<Seconds>> {
            n_calls.fetch_add(1, Ordering::Relaxed);
            Ok(race_time(speed))
        };
        BinarySearch::new(SpeedDomain::default()).optimize(&oracle).unwrap();
        // ⌈log2(45 / 0.1)⌉:
        assert_eq!(n_calls.load(Ordering::Relaxed), 9);
    }

    #[test]
    fn nothing_feasible() {
        let oracle = |_| -> Result<Option<Seconds>> { Ok(None) };
        assert_eq!(BinarySearch::new(SpeedDomain::default()).optimize(&oracle).unwrap(), None);
    }

    #[test]
    fn feasible_only_at_minimum() {
        let oracle = |speed: MetresPerSecond| -> Result<Option<Seconds>> {
            Ok((speed <= MetresPerSecond(5.05)).then(|| Seconds(1000.0 / speed.0)))
        };
        let optimum = BinarySearch::new(SpeedDomain::default()).optimize(&oracle).unwrap().unwrap();
        assert_eq!(optimum.speed, MetresPerSecond(5.0));
        assert_eq!(optimum.race_time, Seconds(200.0));
    }

    #[test]
    fn keeps_the_quickest_feasible_trial() {
        // Feasible everywhere, but the quickest speed is 20 m/s:
        let oracle = |speed: MetresPerSecond| -> Result<Option<Seconds>> {
            Ok(Some(Seconds((speed.0 - 20.0).abs() + 100.0)))
        };
        let optimum = BinarySearch::new(SpeedDomain::default()).optimize(&oracle).unwrap().unwrap();
        // The first midpoint is 27.5 m/s, then the search only moves up:
        assert_eq!(optimum.speed, MetresPerSecond(27.5));
    }
}
