//! Tabu search execution engine.
//!
//! # Algorithm
//!
//! For a fixed number of iterations:
//!
//! 1. Age the tabu list by one iteration.
//! 2. Sample candidate arcs (shorter arcs more likely) and generate every
//!    two-opt*, relocate, exchange and station-in-route move that realises
//!    one of them.
//! 3. Pick the best non-tabu neighbour under
//!    [`ObjectiveEvaluator::is_better`] and make it the current solution,
//!    improving or not.
//! 4. Forbid the applied move for a tenure drawn uniformly from the
//!    configured range and track the best solution seen.
//!
//! # Complexity
//!
//! O(iterations · arcs · n) neighbour evaluations, n = visits per solution.

use rand::Rng;
use tracing::{debug, warn};

use super::{TabuConfig, TabuList};
use crate::error::{EvrpError, Result};
use crate::evaluation::{ObjectiveEvaluator, Penalty};
use crate::models::{Model, Solution};
use crate::neighborhood::{arc_moves, CandidateArcIndex, Neighbor};

/// Tabu search bound to one model's candidate arcs.
///
/// # Examples
///
/// ```
/// use u_evrp::evaluation::{ObjectiveEvaluator, Penalty};
/// use u_evrp::models::{Model, Node, Route, Solution, Vehicle};
/// use u_evrp::random::create_rng;
/// use u_evrp::tabu::{TabuConfig, TabuSearch};
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![
///         Node::customer(1.0, 0.0, 1.0, 0.0),
///         Node::customer(2.0, 0.0, 1.0, 0.0),
///         Node::customer(3.0, 0.0, 1.0, 0.0),
///     ],
///     vec![],
///     Vehicle::new(10.0, 100.0, 1.0),
///     1,
/// )
/// .unwrap();
///
/// let search = TabuSearch::new(&model, TabuConfig::default().with_iterations(10));
/// let eval = ObjectiveEvaluator::new(&model);
/// let start = Solution::new(vec![Route::from_visits(vec![0, 2, 1, 3, 0])]);
/// let best = search
///     .run(&start, &eval, &Penalty::uniform(10.0), &mut create_rng(1))
///     .unwrap();
/// assert!((best.total_distance(&model) - 6.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct TabuSearch {
    config: TabuConfig,
    arcs: CandidateArcIndex,
}

impl TabuSearch {
    /// Builds the candidate arc index of `model`.
    pub fn new(model: &Model, config: TabuConfig) -> Self {
        Self::with_arcs(config, CandidateArcIndex::build(model))
    }

    /// Reuses an already built arc index.
    pub fn with_arcs(config: TabuConfig, arcs: CandidateArcIndex) -> Self {
        Self { config, arcs }
    }

    pub fn config(&self) -> &TabuConfig {
        &self.config
    }

    pub fn arcs(&self) -> &CandidateArcIndex {
        &self.arcs
    }

    /// Runs the search from `start` and returns the best solution seen,
    /// `start` included.
    ///
    /// # Errors
    ///
    /// [`EvrpError::InvariantViolation`] if a generated neighbour no longer
    /// serves every customer exactly once.
    pub fn run<R: Rng + ?Sized>(
        &self,
        start: &Solution,
        evaluator: &ObjectiveEvaluator<'_>,
        penalty: &Penalty,
        rng: &mut R,
    ) -> Result<Solution> {
        let model = evaluator.model();
        let mut tabu = TabuList::new();
        let mut current = start.clone();
        let mut best = start.clone();

        if self.arcs.is_empty() {
            return Ok(best);
        }

        for iteration in 0..self.config.iterations {
            tabu.tick();

            let mut chosen: Option<Neighbor> = None;
            for arc in self.arcs.sample(self.config.candidate_arcs, rng)? {
                for neighbor in arc_moves(&current, model, arc) {
                    if !neighbor.solution.serves_all_customers(model) {
                        return Err(EvrpError::InvariantViolation(format!(
                            "{:?} on arc {:?} broke customer coverage",
                            neighbor.signature, arc
                        )));
                    }
                    if tabu.is_tabu(&neighbor.signature) {
                        continue;
                    }
                    let prev = chosen.as_ref().map(|n| &n.solution);
                    if evaluator.is_better(&neighbor.solution, prev, penalty) {
                        chosen = Some(neighbor);
                    }
                }
            }

            let Some(next) = chosen else {
                warn!(iteration, tabu = tabu.len(), "tabu neighbourhood exhausted");
                continue;
            };
            let tenure = rng.random_range(self.config.tenure_min..=self.config.tenure_max);
            tabu.insert(next.signature, tenure);
            current = next.solution;

            if evaluator.is_better(&current, Some(&best), penalty) {
                best = current.clone();
            }
        }

        debug!(
            iterations = self.config.iterations,
            cost = evaluator.cost(&best, penalty),
            routes = best.num_nonempty_routes(),
            "tabu search finished"
        );
        Ok(best)
    }
}
