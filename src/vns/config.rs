//! VNS-TS configuration.

use serde::{Deserialize, Serialize};

use crate::error::{EvrpError, Result};
use crate::evaluation::{Constraint, Penalty};
use crate::tabu::TabuConfig;

/// Configuration for [`VnsTs`](super::VnsTs).
///
/// The shaking neighbourhoods are every `(routes, segment)` pair with
/// `routes` in `2..=shake_routes` and `segment` in `1..=shake_segment`.
///
/// # Examples
///
/// ```
/// use u_evrp::vns::VnsConfig;
///
/// let config = VnsConfig::default()
///     .with_feasibility_budget(20)
///     .with_distance_budget(10)
///     .with_seed(7);
/// assert_eq!(config.neighborhoods().len(), 15);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VnsConfig {
    /// Largest number of routes a shake touches.
    pub shake_routes: usize,
    /// Longest segment a shake cuts from one route.
    pub shake_segment: usize,
    /// Iterations without reaching feasibility before an empty route is added.
    pub feasibility_budget: usize,
    /// Iterations spent minimising distance once feasible.
    pub distance_budget: usize,
    /// Relative worsening accepted half of the time at the start of a phase.
    pub annealing_delta: f64,
    /// Starting penalty weights.
    pub initial_penalty: Penalty,
    /// Floor of each penalty weight.
    pub penalty_min: Penalty,
    /// Ceiling of each penalty weight.
    pub penalty_max: Penalty,
    /// Factor a penalty weight is multiplied or divided by.
    pub penalty_delta: f64,
    /// Feasibility samples per penalty adjustment window.
    pub penalty_window: usize,
    /// Refinement step settings.
    pub tabu: TabuConfig,
    /// Random seed (None falls back to a fixed seed).
    pub seed: Option<u64>,
}

impl Default for VnsConfig {
    fn default() -> Self {
        Self {
            shake_routes: 4,
            shake_segment: 5,
            feasibility_budget: 100,
            distance_budget: 40,
            annealing_delta: 0.08,
            initial_penalty: Penalty::uniform(10.0),
            penalty_min: Penalty::uniform(0.5),
            penalty_max: Penalty::uniform(5000.0),
            penalty_delta: 1.2,
            penalty_window: 2,
            tabu: TabuConfig::default(),
            seed: None,
        }
    }
}

impl VnsConfig {
    /// Sets the shaking neighbourhood bounds.
    pub fn with_shake(mut self, routes: usize, segment: usize) -> Self {
        self.shake_routes = routes;
        self.shake_segment = segment;
        self
    }

    pub fn with_feasibility_budget(mut self, n: usize) -> Self {
        self.feasibility_budget = n;
        self
    }

    pub fn with_distance_budget(mut self, n: usize) -> Self {
        self.distance_budget = n;
        self
    }

    pub fn with_annealing_delta(mut self, delta: f64) -> Self {
        self.annealing_delta = delta;
        self
    }

    /// Sets the starting weights and the per-constraint range they move
    /// within.
    pub fn with_penalty(mut self, initial: Penalty, min: Penalty, max: Penalty) -> Self {
        self.initial_penalty = initial;
        self.penalty_min = min;
        self.penalty_max = max;
        self
    }

    /// Sets how fast and how often the penalty weights adapt.
    pub fn with_penalty_adaptation(mut self, delta: f64, window: usize) -> Self {
        self.penalty_delta = delta;
        self.penalty_window = window;
        self
    }

    pub fn with_tabu(mut self, tabu: TabuConfig) -> Self {
        self.tabu = tabu;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Shaking neighbourhoods in the order they are cycled through.
    pub fn neighborhoods(&self) -> Vec<(usize, usize)> {
        (2..=self.shake_routes)
            .flat_map(|r| (1..=self.shake_segment).map(move |m| (r, m)))
            .collect()
    }

    /// Checks every parameter range, the tabu settings included.
    pub fn validate(&self) -> Result<()> {
        if self.shake_routes < 2 || self.shake_segment == 0 {
            return Err(EvrpError::InvalidConfig(format!(
                "shake needs at least 2 routes and segment 1, got {} and {}",
                self.shake_routes, self.shake_segment
            )));
        }
        if self.feasibility_budget == 0 || self.distance_budget == 0 {
            return Err(EvrpError::InvalidConfig(
                "phase budgets must be positive".into(),
            ));
        }
        if !(self.annealing_delta > 0.0) {
            return Err(EvrpError::InvalidConfig(format!(
                "annealing delta must be positive, got {}",
                self.annealing_delta
            )));
        }
        validate_penalty(
            &self.initial_penalty,
            &self.penalty_min,
            &self.penalty_max,
            self.penalty_delta,
        )?;
        if self.penalty_window == 0 {
            return Err(EvrpError::InvalidConfig(
                "penalty window must hold at least one sample".into(),
            ));
        }
        self.tabu.validate()
    }
}

/// Checks the per-constraint penalty ranges and the adjustment factor.
fn validate_penalty(initial: &Penalty, min: &Penalty, max: &Penalty, delta: f64) -> Result<()> {
    for c in Constraint::ALL {
        let (lo, hi) = (min.get(c), max.get(c));
        if !(lo > 0.0 && lo <= hi) {
            return Err(EvrpError::InvalidConfig(format!(
                "{c:?} penalty range [{lo}, {hi}] is invalid"
            )));
        }
    }
    if [initial.capacity, initial.time, initial.battery]
        .iter()
        .any(|w| !(*w >= 0.0))
    {
        return Err(EvrpError::InvalidConfig(format!(
            "penalty weights must be non-negative, got {initial:?}"
        )));
    }
    if !(delta > 1.0) {
        return Err(EvrpError::InvalidConfig(format!(
            "penalty delta must exceed 1, got {delta}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let c = VnsConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.neighborhoods().first(), Some(&(2, 1)));
        assert_eq!(c.neighborhoods().last(), Some(&(4, 5)));
    }

    #[test]
    fn test_rejects_bad_ranges() {
        assert!(VnsConfig::default().with_shake(1, 3).validate().is_err());
        assert!(VnsConfig::default()
            .with_penalty(
                Penalty::uniform(1.0),
                Penalty::uniform(10.0),
                Penalty::uniform(1.0),
            )
            .validate()
            .is_err());
        assert!(VnsConfig::default()
            .with_penalty_adaptation(1.0, 2)
            .validate()
            .is_err());
        // only the battery range is inverted
        assert!(VnsConfig::default()
            .with_penalty(
                Penalty::uniform(1.0),
                Penalty::new(0.5, 0.5, 20.0),
                Penalty::new(100.0, 100.0, 10.0),
            )
            .validate()
            .is_err());
        assert!(VnsConfig::default().with_distance_budget(0).validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let c: VnsConfig = serde_json::from_str(r#"{"distance_budget": 7, "seed": 3}"#)
            .expect("valid json");
        assert_eq!(c.distance_budget, 7);
        assert_eq!(c.seed, Some(3));
        assert_eq!(c.shake_routes, 4);
    }
}
