//! DEMA execution engine.
//!
//! # Algorithm
//!
//! 1. Build `population_size` members by random sweep and targeted repair
//!    (time windows, then charging stations), restarting construction when
//!    the repair budget runs out.
//! 2. For each generation:
//!    a. **ACO_GM**: rank the population (feasible by objective, infeasible
//!       by Pareto front on objective and mean arc overlap), fill a parent
//!       pool by binary tournament, and generate `population_size` children
//!       with one of two crossovers chosen by roulette on adaptive weights.
//!    b. **ISSD**: from parents and children keep the best feasible members
//!       up to their quota and the best infeasible ones up to theirs,
//!       backfilling either shortfall from the leftovers.
//!    c. **MVS**: every `local_search_step` generations refine each member
//!       by tabu search; otherwise every `charge_modify_step` generations
//!       repair each member's charging.
//!    d. Track the best feasible member: fewer routes first, then lower
//!       objective.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{binary_tournament, pareto_order, DemaConfig};
use crate::constructive::{random_sweep, Admission};
use crate::error::{EvrpError, Result};
use crate::evaluation::ObjectiveEvaluator;
use crate::models::{Model, Solution};
use crate::neighborhood::{aco_gm_cross1, aco_gm_cross2, mean_overlap};
use crate::random::{create_rng, roulette_select};
use crate::repair::{fix_time_windows, repair_charging};
use crate::tabu::TabuSearch;

/// Everything needed to continue a DEMA run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemaState {
    /// Best feasible solution so far.
    pub best: Option<Solution>,
    /// Objective of `best` under the run's penalty weights.
    pub best_cost: Option<f64>,
    /// Current population.
    pub population: Vec<Solution>,
}

/// Result of a DEMA run.
#[derive(Debug, Clone)]
pub struct DemaResult {
    /// Best feasible solution found, if any member was ever feasible.
    pub best: Option<Solution>,
    /// Objective of `best`.
    pub best_cost: Option<f64>,
    /// Generations executed.
    pub generations: usize,
}

/// Memetic solver bound to one model.
///
/// # Examples
///
/// ```
/// use u_evrp::dema::{Dema, DemaConfig};
/// use u_evrp::models::{Model, Node, Vehicle};
/// use u_evrp::tabu::TabuConfig;
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![
///         Node::customer(1.0, 0.0, 1.0, 0.0),
///         Node::customer(0.0, 1.0, 1.0, 0.0),
///         Node::customer(-1.0, 0.0, 1.0, 0.0),
///         Node::customer(0.0, -1.0, 1.0, 0.0),
///     ],
///     vec![],
///     Vehicle::new(2.0, 100.0, 1.0),
///     2,
/// )
/// .unwrap();
///
/// let config = DemaConfig::default()
///     .with_population_size(4)
///     .with_generations(3)
///     .with_tabu(TabuConfig::default().with_iterations(5))
///     .with_seed(1);
/// let mut dema = Dema::new(&model, config).unwrap();
/// let result = dema.run().unwrap();
/// let best = result.best.unwrap();
/// assert!(best.is_feasible(&model));
/// assert_eq!(dema.state().population.len(), 4);
/// ```
pub struct Dema<'m, R: Rng = StdRng> {
    model: &'m Model,
    config: DemaConfig,
    evaluator: ObjectiveEvaluator<'m>,
    tabu: TabuSearch,
    rng: R,
    population: Vec<Solution>,
    best: Option<(Solution, f64)>,
    since_local_search: usize,
    since_charge_modify: usize,
}

impl<'m> Dema<'m, StdRng> {
    /// Creates a solver seeded from `config.seed`.
    ///
    /// # Errors
    ///
    /// [`EvrpError::InvalidConfig`] if the configuration is out of range.
    pub fn new(model: &'m Model, config: DemaConfig) -> Result<Self> {
        let rng = create_rng(config.seed.unwrap_or(42));
        Self::with_rng(model, config, rng)
    }
}

impl<'m, R: Rng> Dema<'m, R> {
    /// Creates a solver drawing from `rng`.
    pub fn with_rng(model: &'m Model, config: DemaConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let tabu = TabuSearch::new(model, config.tabu.clone());
        Ok(Self {
            model,
            config,
            evaluator: ObjectiveEvaluator::new(model),
            tabu,
            rng,
            population: Vec::new(),
            best: None,
            since_local_search: 0,
            since_charge_modify: 0,
        })
    }

    pub fn config(&self) -> &DemaConfig {
        &self.config
    }

    pub fn population(&self) -> &[Solution] {
        &self.population
    }

    /// Best feasible solution so far and its objective.
    pub fn best(&self) -> Option<(&Solution, f64)> {
        self.best.as_ref().map(|(s, c)| (s, *c))
    }

    /// Copy of the current run state, suitable for a snapshot.
    pub fn state(&self) -> DemaState {
        DemaState {
            best: self.best.as_ref().map(|(s, _)| s.clone()),
            best_cost: self.best.as_ref().map(|(_, c)| *c),
            population: self.population.clone(),
        }
    }

    /// Initializes a fresh population and evolves it.
    pub fn run(&mut self) -> Result<DemaResult> {
        self.population = self.initialization()?;
        self.best = None;
        self.evolve()
    }

    /// Continues from a saved state instead of building a new population.
    ///
    /// # Errors
    ///
    /// [`EvrpError::SnapshotMismatch`] if the population has fewer than two
    /// members or any solution does not serve this model's customers
    /// exactly once.
    pub fn resume(&mut self, state: DemaState) -> Result<DemaResult> {
        if state.population.len() < 2 {
            return Err(EvrpError::SnapshotMismatch(format!(
                "population of {} cannot be bred",
                state.population.len()
            )));
        }
        if let Some(bad) = state
            .population
            .iter()
            .chain(state.best.as_ref())
            .position(|s| !s.serves_all_customers(self.model))
        {
            return Err(EvrpError::SnapshotMismatch(format!(
                "solution {bad} does not serve the model's customers"
            )));
        }
        self.best = match (state.best, state.best_cost) {
            (Some(s), Some(c)) => Some((s, c)),
            (Some(s), None) => {
                let c = self.cost(&s);
                Some((s, c))
            }
            _ => None,
        };
        self.population = state.population;
        self.evolve()
    }

    fn evolve(&mut self) -> Result<DemaResult> {
        let population = std::mem::take(&mut self.population);
        self.update_best(&population);
        self.population = population;

        for generation in 0..self.config.generations {
            let mut merged = std::mem::take(&mut self.population);
            let children = self.aco_gm(&merged)?;
            merged.extend(children);
            let survivors = self.issd(merged);
            let intensified = self.mvs(survivors, generation)?;
            self.update_best(&intensified);
            self.population = intensified;

            let feasible = self
                .population
                .iter()
                .filter(|s| s.is_feasible(self.model))
                .count();
            info!(
                generation,
                feasible,
                best_cost = self.best.as_ref().map(|(_, c)| *c),
                best_routes = self.best.as_ref().map(|(s, _)| s.num_nonempty_routes()),
                "dema generation"
            );
        }

        Ok(DemaResult {
            best: self.best.as_ref().map(|(s, _)| s.clone()),
            best_cost: self.best.as_ref().map(|(_, c)| *c),
            generations: self.config.generations,
        })
    }

    fn cost(&self, solution: &Solution) -> f64 {
        self.evaluator.cost(solution, &self.config.penalty)
    }

    /// Builds `population_size` repaired members.
    pub fn initialization(&mut self) -> Result<Vec<Solution>> {
        let mut population = Vec::with_capacity(self.config.population_size);
        while population.len() < self.config.population_size {
            let member = self.construct_member()?;
            population.push(member);
        }
        Ok(population)
    }

    fn construct_member(&mut self) -> Result<Solution> {
        let mut last = None;
        for _ in 0..self.config.max_construction_restarts {
            let built = random_sweep(self.model, Admission::CapacityAndTime, None, &mut self.rng);
            ensure_coverage(&built, self.model, "sweep construction")?;
            let (repaired, ok) = self.repair(built);
            ensure_coverage(&repaired, self.model, "construction repair")?;
            if ok {
                return Ok(repaired);
            }
            last = Some(repaired);
        }
        warn!(
            restarts = self.config.max_construction_restarts,
            "admitting an unrepaired population member"
        );
        last.ok_or_else(|| EvrpError::InvalidConfig("no construction attempted".into()))
    }

    /// Fixes time windows and charging until neither is violated or the
    /// attempt budget is spent. The flag tells whether the repair finished.
    fn repair(&self, mut solution: Solution) -> (Solution, bool) {
        let mut attempts = 0;
        loop {
            let broken = solution.routes().iter().find_map(|r| {
                if !r.is_time_feasible(self.model) {
                    Some(Broken::Time)
                } else if !r.is_battery_feasible(self.model) {
                    Some(Broken::Battery)
                } else {
                    None
                }
            });
            match broken {
                None => return (solution, true),
                Some(_) if attempts == self.config.max_repair_attempts => return (solution, false),
                Some(Broken::Time) => solution = fix_time_windows(&solution, self.model),
                Some(Broken::Battery) => {
                    if !repair_charging(&mut solution, self.model) {
                        return (solution, false);
                    }
                }
            }
            attempts += 1;
        }
    }

    /// Splits `population` into feasible members sorted by objective and
    /// infeasible members in Pareto order of (objective, mean overlap).
    fn rank(&self, population: Vec<Solution>) -> (Vec<Solution>, Vec<Solution>) {
        let overlaps: Vec<Option<f64>> = population
            .iter()
            .map(|s| {
                if s.is_feasible(self.model) {
                    None
                } else {
                    Some(mean_overlap(s, &population))
                }
            })
            .collect();

        let mut feasible = Vec::new();
        let mut infeasible = Vec::new();
        for (solution, overlap) in population.into_iter().zip(overlaps) {
            let cost = self.cost(&solution);
            match overlap {
                None => feasible.push((solution, cost)),
                Some(o) => infeasible.push((solution, (cost, o))),
            }
        }
        feasible.sort_by(|a, b| a.1.total_cmp(&b.1));

        let points: Vec<(f64, f64)> = infeasible.iter().map(|(_, p)| *p).collect();
        let mut slots: Vec<Option<Solution>> = infeasible.into_iter().map(|(s, _)| Some(s)).collect();
        let infeasible = pareto_order(&points)
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        (feasible.into_iter().map(|(s, _)| s).collect(), infeasible)
    }

    /// Generates `population_size` children from `population`.
    ///
    /// With a single member only the one-parent crossover can run.
    ///
    /// # Errors
    ///
    /// [`EvrpError::InvariantViolation`] if `population` is empty or a child
    /// stops serving every customer.
    pub fn aco_gm(&mut self, population: &[Solution]) -> Result<Vec<Solution>> {
        if population.is_empty() {
            return Err(EvrpError::InvariantViolation(
                "crossover needs a non-empty population".into(),
            ));
        }
        let (feasible, infeasible) = self.rank(population.to_vec());
        let ranked: Vec<Solution> = feasible.into_iter().chain(infeasible).collect();
        let costs: Vec<f64> = ranked.iter().map(|s| self.cost(s)).collect();
        let min_cost = costs.iter().copied().fold(f64::INFINITY, f64::min);
        let pool: Vec<usize> = (0..ranked.len())
            .map(|_| binary_tournament(ranked.len(), &mut self.rng))
            .collect();

        let theta = self.config.theta;
        let two_parents = pool.len() >= 2;
        let mut stats = [CrossoverStats::default(); 2];
        let mut children = Vec::with_capacity(self.config.population_size);
        while children.len() < self.config.population_size {
            for s in &mut stats {
                s.smooth(theta);
            }
            let op = choose_crossover(&stats, two_parents, &mut self.rng);

            let (child, parent) = if op == 0 {
                let p = pool[self.rng.random_range(0..pool.len())];
                (aco_gm_cross1(&ranked[p], self.model, &mut self.rng), p)
            } else {
                let picks = index::sample(&mut self.rng, pool.len(), 2);
                let (p, donor) = (pool[picks.index(0)], pool[picks.index(1)]);
                (aco_gm_cross2(&ranked[p], &ranked[donor], self.model), p)
            };
            ensure_coverage(&child, self.model, "crossover")?;

            let cost = self.cost(&child);
            stats[op].record(crossover_score(cost, min_cost, costs[parent], &self.config.scores));
            children.push(child);
        }
        debug!(?stats, "crossover usage");
        Ok(children)
    }

    /// Survivor selection down to `population_size` members.
    pub fn issd(&self, merged: Vec<Solution>) -> Vec<Solution> {
        let size = self.config.population_size;
        let feasible_quota = self.config.feasible_quota().min(size);
        let infeasible_quota = size - feasible_quota;

        let (feasible, infeasible) = self.rank(merged);
        let mut feasible = feasible.into_iter();
        let mut infeasible = infeasible.into_iter();
        let mut survivors: Vec<Solution> = feasible.by_ref().take(feasible_quota).collect();
        survivors.extend(infeasible.by_ref().take(infeasible_quota));
        let missing = size.saturating_sub(survivors.len());
        survivors.extend(feasible.chain(infeasible).take(missing));
        survivors
    }

    /// Periodic intensification: tabu search takes precedence over the
    /// charging repair when both are due.
    pub fn mvs(&mut self, population: Vec<Solution>, generation: usize) -> Result<Vec<Solution>> {
        self.since_local_search += 1;
        self.since_charge_modify += 1;
        if self.since_local_search >= self.config.local_search_step {
            self.since_local_search = 0;
            debug!(generation, "tabu intensification");
            return population
                .iter()
                .map(|s| {
                    self.tabu
                        .run(s, &self.evaluator, &self.config.penalty, &mut self.rng)
                })
                .collect();
        }
        if self.since_charge_modify >= self.config.charge_modify_step {
            self.since_charge_modify = 0;
            debug!(generation, "charging repair");
            return Ok(population
                .into_iter()
                .map(|mut s| {
                    repair_charging(&mut s, self.model);
                    s
                })
                .collect());
        }
        Ok(population)
    }

    /// Replaces the incumbent with any feasible member using fewer routes,
    /// or as many routes at a lower objective.
    fn update_best(&mut self, population: &[Solution]) {
        for solution in population {
            if !solution.is_feasible(self.model) {
                continue;
            }
            let cost = self.cost(solution);
            let routes = solution.num_nonempty_routes();
            let replace = match &self.best {
                None => true,
                Some((best, best_cost)) => {
                    let best_routes = best.num_nonempty_routes();
                    routes < best_routes || (routes == best_routes && cost < *best_cost)
                }
            };
            if replace {
                self.best = Some((solution.clone(), cost));
            }
        }
    }
}

/// Running score and smoothed weight of one crossover operator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct CrossoverStats {
    weight: f64,
    score: f64,
    calls: usize,
}

impl CrossoverStats {
    fn record(&mut self, score: f64) {
        self.score += score;
        self.calls += 1;
    }

    /// w = theta * (score / calls) + (1 - theta) * w, once the operator has
    /// been called.
    fn smooth(&mut self, theta: f64) {
        if self.calls > 0 {
            self.weight = theta * self.score / self.calls as f64 + (1.0 - theta) * self.weight;
        }
    }
}

/// Roulette on the smoothed weights, uniform while both are zero. Without
/// two parents to draw, the one-parent crossover is forced.
fn choose_crossover<R: Rng + ?Sized>(
    stats: &[CrossoverStats; 2],
    two_parents: bool,
    rng: &mut R,
) -> usize {
    if !two_parents {
        return 0;
    }
    roulette_select(&[stats[0].weight, stats[1].weight], rng)
}

/// Score earned by a child: `tiers[0]` below every current cost,
/// `tiers[1]` below its own parent, `tiers[2]` otherwise.
fn crossover_score(cost: f64, min_cost: f64, parent_cost: f64, tiers: &[f64; 3]) -> f64 {
    if cost < min_cost {
        tiers[0]
    } else if cost < parent_cost {
        tiers[1]
    } else {
        tiers[2]
    }
}

enum Broken {
    Time,
    Battery,
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
