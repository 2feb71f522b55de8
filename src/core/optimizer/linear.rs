use rayon::prelude::*;

use crate::{
    core::optimizer::{Optimizer, Optimum, Oracle, SpeedDomain},
    prelude::*,
    quantity::mechanics::MetresPerSecond,
};

/// Exhaustive scan over the speed grid.
///
/// The grid points are independent runs, so they are evaluated in parallel.
#[must_use]
pub struct LinearScan {
    domain: SpeedDomain,
}

impl LinearScan {
    pub const fn new(domain: SpeedDomain) -> Self {
        Self { domain }
    }

    /// Number of grid points, including both ends of the domain.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn n_points(&self) -> usize {
        // Tolerate the rounding error so that the maximum stays on the grid:
        let n_steps = (self.domain.max - self.domain.min) / self.domain.precision + 1e-9;
        n_steps.floor() as usize + 1
    }

    #[expect(clippy::cast_precision_loss)]
    fn speed_at(&self, index: usize) -> MetresPerSecond {
        self.domain.min + self.domain.precision * index as f64
    }
}

impl Optimizer for LinearScan {
    #[instrument(skip_all, fields(min = %self.domain.min, max = %self.domain.max))]
    fn optimize(&self, oracle: &dyn Oracle) -> Result<Option<Optimum>> {
        let trials = (0..self.n_points())
            .into_par_iter()
            .map(|index| -> Result<_> {
                let speed = self.speed_at(index);
                Ok((speed, oracle.race_time(speed)?))
            })
            .collect::<Result<Vec<_>>>()?;
        let n_feasible = trials.iter().filter(|(_, race_time)| race_time.is_some()).count();
        info!(n_trials = trials.len(), n_feasible, "scanned");

        // Ties go to the lower speed since the trials are ordered:
        Ok(trials
            .into_iter()
            .filter_map(|(speed, race_time)| Some(Optimum { speed, race_time: race_time? }))
            .min_by_key(|optimum| optimum.race_time))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::quantity::time::Seconds;

    #[test]
    fn grid_includes_both_ends() {
        let scan = LinearScan::new(SpeedDomain::default());
        assert_eq!(scan.n_points(), 451);
        assert_abs_diff_eq!(scan.speed_at(0).0, 5.0);
        assert_abs_diff_eq!(scan.speed_at(450).0, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn evaluates_every_grid_point() {
        let n_calls = AtomicUsize::new(0);
        let oracle = |_: MetresPerSecond| -> Result<Option<Seconds>> {
            n_calls.fetch_add(1, Ordering::Relaxed);
            Ok(None)
        };
        let optimum = LinearScan::new(SpeedDomain::default()).optimize(&oracle).unwrap();
        assert_eq!(optimum, None);
        assert_eq!(n_calls.load(Ordering::Relaxed), 451);
    }

    #[test]
    fn fastest_feasible_speed() {
        let oracle = |speed: MetresPerSecond| -> Result<Option<Seconds>> {
            Ok((speed.0 <= 30.0 + 1e-9).then(|| Seconds(1000.0 / speed.0)))
        };
        let optimum = LinearScan::new(SpeedDomain::default()).optimize(&oracle).unwrap().unwrap();
        assert_abs_diff_eq!(optimum.speed.0, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn best_sample_of_non_monotonic_race_time() {
        let oracle = |speed: MetresPerSecond| -> Result<Option<Seconds>> {
            Ok(Some(Seconds((speed.0 - 20.0).powi(2) + 100.0)))
        };
        let optimum = LinearScan::new(SpeedDomain::default()).optimize(&oracle).unwrap().unwrap();
        assert_abs_diff_eq!(optimum.speed.0, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(optimum.race_time.0, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn ties_go_to_lower_speed() {
        let oracle = |_: MetresPerSecond| -> Result<Option<Seconds>> { Ok(Some(Seconds(1.0))) };
        let optimum = LinearScan::new(SpeedDomain::default()).optimize(&oracle).unwrap().unwrap();
        assert_eq!(optimum.speed, MetresPerSecond(5.0));
    }

    #[test]
    fn propagates_errors() {
        let oracle = |speed: MetresPerSecond| -> Result<Option<Seconds>> {
            ensure!(speed < MetresPerSecond(40.0), "boom");
            Ok(None)
        };
        assert!(LinearScan::new(SpeedDomain::default()).optimize(&oracle).is_err());
    }
}
