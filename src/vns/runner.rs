//! VNS-TS execution engine.
//!
//! # Algorithm
//!
//! 1. Build a random sweep solution capped at the fleet size.
//! 2. Each iteration:
//!    a. Record the current solution as best if it is preferred.
//!    b. Feed its feasibility to the adaptive penalty weights.
//!    c. Shake with cyclic exchange at neighbourhood `k`, refine with tabu
//!       search.
//!    d. Accept the refined solution if it is preferred over the current
//!       one or the phase's annealing schedule lets it through; accepting
//!       resets `k`, rejecting advances it circularly.
//! 3. While looking for feasibility, every `feasibility_budget` iterations
//!    without success add an empty route. Once feasible, run
//!    `distance_budget` more iterations and stop.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use super::VnsConfig;
use crate::constructive::{random_sweep, Admission};
use crate::error::{EvrpError, Result};
use crate::evaluation::{ObjectiveEvaluator, Penalty, PenaltyController};
use crate::models::{Model, Solution};
use crate::neighborhood::cyclic_exchange;
use crate::random::create_rng;
use crate::sa::AnnealingSchedule;
use crate::tabu::TabuSearch;

/// Stage of a VNS-TS run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No feasible solution reached yet.
    Feasibility,
    /// Feasible; minimising distance.
    Distance,
}

/// Result of a VNS-TS run.
#[derive(Debug, Clone)]
pub struct VnsResult {
    /// Best solution found.
    pub best: Solution,
    /// Penalized objective of `best` under the final weights.
    pub best_cost: f64,
    /// Total iterations executed.
    pub iterations: usize,
    /// Iterations spent before the first feasible solution, if one was found.
    pub feasible_after: Option<usize>,
}

/// VNS-TS solver bound to one model.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Vehicle};
/// use u_evrp::tabu::TabuConfig;
/// use u_evrp::vns::{VnsConfig, VnsTs};
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![
///         Node::customer(1.0, 0.0, 1.0, 0.0),
///         Node::customer(2.0, 0.0, 1.0, 0.0),
///         Node::customer(3.0, 0.0, 1.0, 0.0),
///     ],
///     vec![],
///     Vehicle::new(3.0, 100.0, 1.0),
///     1,
/// )
/// .unwrap();
///
/// let config = VnsConfig::default()
///     .with_distance_budget(5)
///     .with_tabu(TabuConfig::default().with_iterations(10))
///     .with_seed(1);
/// let result = VnsTs::new(&model, config).unwrap().run().unwrap();
/// assert!(result.best.is_feasible(&model));
/// assert!((result.best.total_distance(&model) - 6.0).abs() < 1e-10);
/// ```
pub struct VnsTs<'m, R: Rng = StdRng> {
    model: &'m Model,
    config: VnsConfig,
    evaluator: ObjectiveEvaluator<'m>,
    penalty: PenaltyController,
    tabu: TabuSearch,
    rng: R,
}

impl<'m> VnsTs<'m, StdRng> {
    /// Creates a solver seeded from `config.seed`.
    ///
    /// # Errors
    ///
    /// [`EvrpError::InvalidConfig`] if the configuration is out of range.
    pub fn new(model: &'m Model, config: VnsConfig) -> Result<Self> {
        let rng = create_rng(config.seed.unwrap_or(42));
        Self::with_rng(model, config, rng)
    }
}

impl<'m, R: Rng> VnsTs<'m, R> {
    /// Creates a solver drawing from `rng`.
    pub fn with_rng(model: &'m Model, config: VnsConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let penalty = PenaltyController::new(
            config.initial_penalty,
            config.penalty_min,
            config.penalty_max,
            config.penalty_delta,
            config.penalty_window,
        );
        let tabu = TabuSearch::new(model, config.tabu.clone());
        Ok(Self {
            model,
            config,
            evaluator: ObjectiveEvaluator::new(model),
            penalty,
            tabu,
            rng,
        })
    }

    pub fn config(&self) -> &VnsConfig {
        &self.config
    }

    /// Current penalty weights.
    pub fn penalty(&self) -> &Penalty {
        self.penalty.weights()
    }

    /// Runs from a random sweep solution limited to the fleet size.
    pub fn run(&mut self) -> Result<VnsResult> {
        let initial = random_sweep(
            self.model,
            Admission::CapacityAndBattery,
            Some(self.model.max_vehicles()),
            &mut self.rng,
        );
        self.run_from(initial)
    }

    /// Refines `solution` with one tabu search under the current weights.
    pub fn tabu_search(&mut self, solution: &Solution) -> Result<Solution> {
        self.tabu
            .run(solution, &self.evaluator, self.penalty.weights(), &mut self.rng)
    }

    /// Runs from `initial`.
    ///
    /// # Errors
    ///
    /// [`EvrpError::InvariantViolation`] if `initial` or any generated
    /// solution does not serve every customer exactly once.
    pub fn run_from(&mut self, initial: Solution) -> Result<VnsResult> {
        let model = self.model;
        ensure_coverage(&initial, model, "initial solution")?;

        let neighborhoods = self.config.neighborhoods();
        let sa_feasibility =
            AnnealingSchedule::new(self.config.annealing_delta, self.config.feasibility_budget);
        let sa_distance =
            AnnealingSchedule::new(self.config.annealing_delta, self.config.distance_budget);

        let mut current = initial;
        let mut best: Option<Solution> = None;
        let mut phase = Phase::Feasibility;
        let mut feasible_after = None;
        let mut counter = 0;
        let mut k = 0;
        let mut iteration = 0;

        loop {
            if phase == Phase::Feasibility && current.is_feasible(model) {
                info!(iteration, routes = current.num_nonempty_routes(), "feasible solution reached");
                phase = Phase::Distance;
                feasible_after = Some(iteration);
                counter = 0;
            }
            if self
                .evaluator
                .is_better(&current, best.as_ref(), self.penalty.weights())
            {
                best = Some(current.clone());
            }
            self.penalty.observe(&current, model);
            let weights = *self.penalty.weights();

            let (routes, segment) = neighborhoods[k];
            let shaken = cyclic_exchange(&current, routes, segment, &mut self.rng);
            ensure_coverage(&shaken, model, "cyclic exchange")?;
            let refined = self.tabu.run(&shaken, &self.evaluator, &weights, &mut self.rng)?;

            let accepted = self.evaluator.is_better(&refined, Some(&current), &weights) || {
                let new = self.evaluator.cost(&refined, &weights);
                let old = self.evaluator.cost(&current, &weights);
                let schedule = match phase {
                    Phase::Feasibility => &sa_feasibility,
                    Phase::Distance => &sa_distance,
                };
                schedule.accepts(new, old, counter, &mut self.rng)
            };
            debug!(
                iteration,
                ?phase,
                neighborhood = k,
                accepted,
                cost = self.evaluator.cost(&refined, &weights),
                "vns iteration"
            );
            if accepted {
                current = refined;
                k = 0;
            } else {
                k = (k + 1) % neighborhoods.len();
            }

            counter += 1;
            iteration += 1;
            match phase {
                Phase::Feasibility if counter >= self.config.feasibility_budget => {
                    current.add_empty_route();
                    counter = 0;
                    debug!(iteration, routes = current.num_routes(), "added an empty route");
                }
                Phase::Distance if counter >= self.config.distance_budget => break,
                _ => {}
            }
        }

        if self
            .evaluator
            .is_better(&current, best.as_ref(), self.penalty.weights())
        {
            best = Some(current);
        }
        let best = best.ok_or_else(|| {
            EvrpError::InvariantViolation("search ended without a best solution".into())
        })?;
        let best_cost = self.evaluator.cost(&best, self.penalty.weights());
        info!(iteration, best_cost, routes = best.num_nonempty_routes(), "vns-ts finished");
        Ok(VnsResult {
            best,
            best_cost,
            iterations: iteration,
            feasible_after,
        })
    }
}

fn ensure_coverage(solution: &Solution, model: &Model, origin: &str) -> Result<()> {
    if solution.serves_all_customers(model) {
        Ok(())
    } else {
        Err(EvrpError::InvariantViolation(format!(
            "{origin} does not serve every customer exactly once"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, Route, TimeWindow, Vehicle};
    use crate::tabu::TabuConfig;

    fn line() -> Model {
        Model::new(
            Node::depot(0.0, 0.0),
            vec![
                Node::customer(1.0, 0.0, 2.0, 0.0)
                    .with_time_window(TimeWindow::new(0.0, 1000.0).expect("valid")),
                Node::customer(2.0, 0.0, 3.0, 0.0)
                    .with_time_window(TimeWindow::new(0.0, 1000.0).expect("valid")),
                Node::customer(3.0, 0.0, 5.0, 0.0)
                    .with_time_window(TimeWindow::new(0.0, 1000.0).expect("valid")),
            ],
            vec![],
            Vehicle::new(10.0, 100.0, 1.0),
            1,
        )
        .expect("valid model")
    }

    fn quick() -> VnsConfig {
        VnsConfig::default()
            .with_distance_budget(8)
            .with_tabu(TabuConfig::default().with_iterations(15))
            .with_seed(3)
    }

    #[test]
    fn test_line_converges_to_sorted_route() {
        let m = line();
        let result = VnsTs::new(&m, quick()).expect("valid").run().expect("ok");
        assert_eq!(result.feasible_after, Some(0));
        assert_eq!(result.best.num_nonempty_routes(), 1);
        assert!(result.best.is_feasible(&m));
        assert!((result.best_cost - 6.0).abs() < 1e-10);
        assert_eq!(result.iterations, 8);
    }

    #[test]
    fn test_infeasible_start_gets_extra_routes() {
        // two customers that cannot share a vehicle, one route to start
        let m = Model::new(
            Node::depot(0.0, 0.0),
            vec![
                Node::customer(1.0, 0.0, 8.0, 0.0),
                Node::customer(-1.0, 0.0, 8.0, 0.0),
            ],
            vec![],
            Vehicle::new(10.0, 100.0, 1.0),
            1,
        )
        .expect("valid model");
        let config = VnsConfig::default()
            .with_feasibility_budget(2)
            .with_distance_budget(3)
            .with_tabu(TabuConfig::default().with_iterations(5))
            .with_seed(9);
        let start = Solution::new(vec![Route::from_visits(vec![0, 1, 2, 0])]);
        let result = VnsTs::new(&m, config)
            .expect("valid")
            .run_from(start)
            .expect("ok");
        assert!(result.best.is_feasible(&m));
        assert_eq!(result.best.num_nonempty_routes(), 2);
        assert!(result.feasible_after.is_some());
    }

    #[test]
    fn test_rejects_broken_initial_solution() {
        let m = line();
        let start = Solution::new(vec![Route::from_visits(vec![0, 1, 2, 0])]);
        let err = VnsTs::new(&m, quick()).expect("valid").run_from(start);
        assert!(matches!(err, Err(EvrpError::InvariantViolation(_))));
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let m = line();
        let a = VnsTs::new(&m, quick()).expect("valid").run().expect("ok");
        let b = VnsTs::new(&m, quick()).expect("valid").run().expect("ok");
        assert_eq!(a.best, b.best);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let m = line();
        let bad = VnsConfig::default().with_shake(1, 1);
        assert!(VnsTs::new(&m, bad).is_err());
    }
}
