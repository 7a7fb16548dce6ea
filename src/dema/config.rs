//! DEMA configuration.

use serde::{Deserialize, Serialize};

use crate::error::{EvrpError, Result};
use crate::evaluation::Penalty;
use crate::tabu::TabuConfig;

/// Configuration for [`Dema`](super::Dema).
///
/// # Examples
///
/// ```
/// use u_evrp::dema::DemaConfig;
///
/// let config = DemaConfig::default()
///     .with_population_size(10)
///     .with_generations(20)
///     .with_seed(5);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.feasible_quota(), 7);
/// assert!(DemaConfig::default().with_population_size(3).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemaConfig {
    /// Number of solutions kept between generations.
    pub population_size: usize,
    /// Number of generations.
    pub generations: usize,
    /// Share of the population reserved for infeasible solutions.
    pub infeasible_proportion: f64,
    /// Smoothing factor of the crossover weights; higher follows recent
    /// scores more closely.
    pub theta: f64,
    /// Generations between tabu-search intensifications.
    pub local_search_step: usize,
    /// Generations between charging-station repairs of the population.
    pub charge_modify_step: usize,
    /// Fixed penalty weights.
    pub penalty: Penalty,
    /// Crossover score for a child that beats every current cost, beats its
    /// parent, or neither.
    pub scores: [f64; 3],
    /// Repair steps tried on a constructed solution before it is discarded.
    pub max_repair_attempts: usize,
    /// Constructions tried per population member before an unrepaired one
    /// is admitted.
    pub max_construction_restarts: usize,
    /// Intensification settings.
    pub tabu: TabuConfig,
    /// Random seed (None falls back to a fixed seed).
    pub seed: Option<u64>,
}

impl Default for DemaConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            generations: 100,
            infeasible_proportion: 0.25,
            theta: 0.7,
            local_search_step: 10,
            charge_modify_step: 14,
            penalty: Penalty::new(15.0, 5.0, 10.0),
            scores: [10.0, 5.0, 1.0],
            max_repair_attempts: 10,
            max_construction_restarts: 50,
            tabu: TabuConfig::default(),
            seed: None,
        }
    }
}

impl DemaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    pub fn with_infeasible_proportion(mut self, p: f64) -> Self {
        self.infeasible_proportion = p;
        self
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    /// Sets how often the population is intensified and recharged.
    pub fn with_steps(mut self, local_search: usize, charge_modify: usize) -> Self {
        self.local_search_step = local_search;
        self.charge_modify_step = charge_modify;
        self
    }

    pub fn with_penalty(mut self, penalty: Penalty) -> Self {
        self.penalty = penalty;
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

    /// Members reserved for feasible solutions during survivor selection.
    pub fn feasible_quota(&self) -> usize {
        ((1.0 - self.infeasible_proportion) * self.population_size as f64) as usize
    }

    /// Checks every parameter range, the tabu settings included.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 4 {
            return Err(EvrpError::InvalidConfig(format!(
                "population needs at least 4 members, got {}",
                self.population_size
            )));
        }
        if !(0.0..=1.0).contains(&self.infeasible_proportion) {
            return Err(EvrpError::InvalidConfig(format!(
                "infeasible proportion {} is outside [0, 1]",
                self.infeasible_proportion
            )));
        }
        if !(self.theta > 0.0 && self.theta <= 1.0) {
            return Err(EvrpError::InvalidConfig(format!(
                "theta {} is outside (0, 1]",
                self.theta
            )));
        }
        if self.local_search_step == 0 || self.charge_modify_step == 0 {
            return Err(EvrpError::InvalidConfig(
                "intensification steps must be positive".into(),
            ));
        }
        if self.max_construction_restarts == 0 {
            return Err(EvrpError::InvalidConfig(
                "at least one construction per member is required".into(),
            ));
        }
        let weights = [self.penalty.capacity, self.penalty.time, self.penalty.battery];
        if weights.iter().chain(&self.scores).any(|w| !(*w >= 0.0)) {
            return Err(EvrpError::InvalidConfig(
                "penalty weights and crossover scores must be non-negative".into(),
            ));
        }
        self.tabu.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = DemaConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.feasible_quota(), 22);
        assert_eq!(c.penalty, Penalty::new(15.0, 5.0, 10.0));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(DemaConfig::default()
            .with_infeasible_proportion(1.5)
            .validate()
            .is_err());
        assert!(DemaConfig::default().with_theta(0.0).validate().is_err());
        assert!(DemaConfig::default().with_steps(0, 3).validate().is_err());
        assert!(DemaConfig::default()
            .with_penalty(Penalty::new(-1.0, 1.0, 1.0))
            .validate()
            .is_err());
    }
}
