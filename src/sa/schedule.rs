//! Linear cooling schedule with a relative-delta Metropolis criterion.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Acceptance probabilities for a fixed number of iterations.
///
/// The initial temperature is chosen so that a candidate `delta` (relative)
/// worse than the incumbent is accepted with probability 0.5. The
/// temperature then decreases linearly to zero at `horizon`.
///
/// # Examples
///
/// ```
/// use u_evrp::sa::AnnealingSchedule;
///
/// let sa = AnnealingSchedule::new(0.08, 100);
/// // 8% worse at the start: coin flip
/// assert!((sa.probability(108.0, 100.0, 0) - 0.5).abs() < 1e-10);
/// // improving moves always pass
/// assert_eq!(sa.probability(90.0, 100.0, 50), 1.0);
/// // nothing worse passes once the schedule is spent
/// assert_eq!(sa.probability(101.0, 100.0, 100), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnealingSchedule {
    initial_temperature: f64,
    horizon: usize,
}

impl AnnealingSchedule {
    /// Creates a schedule accepting a `delta`-worse candidate half of the
    /// time at iteration 0, cooling to zero over `horizon` iterations.
    pub fn new(delta: f64, horizon: usize) -> Self {
        Self {
            initial_temperature: delta / std::f64::consts::LN_2,
            horizon: horizon.max(1),
        }
    }

    pub fn initial_temperature(&self) -> f64 {
        self.initial_temperature
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Temperature at `iteration`, never negative.
    pub fn temperature(&self, iteration: usize) -> f64 {
        let progress = iteration as f64 / self.horizon as f64;
        (self.initial_temperature * (1.0 - progress)).max(0.0)
    }

    /// Probability of accepting a move from `old` to `new` objective.
    pub fn probability(&self, new: f64, old: f64, iteration: usize) -> f64 {
        if new <= old {
            return 1.0;
        }
        let temperature = self.temperature(iteration);
        if temperature <= 0.0 {
            return 0.0;
        }
        let relative = if old.abs() > f64::EPSILON {
            (new - old) / old.abs()
        } else {
            new - old
        };
        (-relative / temperature).exp()
    }

    /// Draws against [`probability`](Self::probability).
    pub fn accepts<R: Rng + ?Sized>(&self, new: f64, old: f64, iteration: usize, rng: &mut R) -> bool {
        rng.random::<f64>() < self.probability(new, old, iteration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_temperature_linear() {
        let sa = AnnealingSchedule::new(0.08, 40);
        let t0 = sa.initial_temperature();
        assert!((sa.temperature(20) - t0 / 2.0).abs() < 1e-12);
        assert_eq!(sa.temperature(40), 0.0);
        assert_eq!(sa.temperature(400), 0.0);
    }

    #[test]
    fn test_probability_decreases() {
        let sa = AnnealingSchedule::new(0.08, 100);
        let early = sa.probability(110.0, 100.0, 10);
        let late = sa.probability(110.0, 100.0, 90);
        let worse = sa.probability(130.0, 100.0, 10);
        assert!(early > late);
        assert!(early > worse);
        assert!(late > 0.0);
    }

    #[test]
    fn test_zero_old_objective() {
        let sa = AnnealingSchedule::new(0.08, 10);
        let p = sa.probability(0.01, 0.0, 0);
        assert!(p > 0.0 && p < 1.0);
    }

    #[test]
    fn test_accepts_follows_probability() {
        let sa = AnnealingSchedule::new(0.08, 100);
        let mut rng = create_rng(3);
        assert!(sa.accepts(99.0, 100.0, 0, &mut rng));
        assert!(!sa.accepts(150.0, 100.0, 100, &mut rng));
        let hits = (0..2000)
            .filter(|_| sa.accepts(108.0, 100.0, 0, &mut rng))
            .count();
        assert!((800..1200).contains(&hits));
    }
}
