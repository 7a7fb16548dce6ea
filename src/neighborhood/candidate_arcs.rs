//! Pruned set of directed arcs that can appear in some route.
//!
//! # Algorithm
//!
//! Every ordered pair of distinct nodes is kept unless it is provably
//! useless: a depot/recharger pair at the same location, two customers
//! whose joint demand exceeds capacity, a pair that cannot meet the second
//! node's deadline (or then return to the depot in time), or, when
//! rechargers exist, two customers that cannot be bridged between their
//! nearest stations on one battery.
//!
//! # Complexity
//!
//! O(N²) to build; sampling is O(A log k) for A kept arcs and k drawn.

use rand::Rng;

use super::DISTANCE_EPSILON;
use crate::error::Result;
use crate::models::{Model, NodeKind};
use crate::random::weighted_sample;

/// Candidate arcs and their (positive) lengths.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Vehicle};
/// use u_evrp::neighborhood::CandidateArcIndex;
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![Node::customer(1.0, 0.0, 60.0, 0.0), Node::customer(2.0, 0.0, 60.0, 0.0)],
///     vec![],
///     Vehicle::new(100.0, 100.0, 1.0),
///     2,
/// )
/// .unwrap();
///
/// let arcs = CandidateArcIndex::build(&model);
/// // customers 1 and 2 cannot share a vehicle
/// assert!(!arcs.contains(1, 2));
/// assert!(arcs.contains(0, 1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CandidateArcIndex {
    arcs: Vec<(usize, usize)>,
    lengths: Vec<f64>,
}

impl CandidateArcIndex {
    /// Builds the index for `model`.
    pub fn build(model: &Model) -> Self {
        let vehicle = model.vehicle();
        let depot = model.depot();
        let has_stations = !model.rechargers().is_empty();
        let mut arcs = Vec::new();
        let mut lengths = Vec::new();

        for from in model.nodes() {
            for to in model.nodes() {
                if from.id() == to.id() {
                    continue;
                }
                let pair = (from.kind(), to.kind());
                let colocated_station = matches!(
                    pair,
                    (NodeKind::Depot, NodeKind::Recharger) | (NodeKind::Recharger, NodeKind::Depot)
                ) && from.same_location(to);
                if colocated_station {
                    continue;
                }

                let both_customers = pair == (NodeKind::Customer, NodeKind::Customer);
                if both_customers && from.demand() + to.demand() > vehicle.capacity() {
                    continue;
                }

                let d = model.distance(from.id(), to.id());
                let reach = from.ready_time() + from.service_time() + d;
                if reach > to.due_time() {
                    continue;
                }
                if reach + to.service_time() + model.distance(to.id(), Model::DEPOT)
                    > depot.due_time()
                {
                    continue;
                }

                if has_stations && both_customers {
                    let via = |node: usize| {
                        model
                            .nearest_stations(node)
                            .first()
                            .map_or(0.0, |&s| model.distance(node, s))
                    };
                    let bridge = via(from.id()) + d + via(to.id());
                    if vehicle.energy_for(bridge) > vehicle.max_battery() {
                        continue;
                    }
                }

                arcs.push((from.id(), to.id()));
                lengths.push(if d > 0.0 { d } else { DISTANCE_EPSILON });
            }
        }

        Self { arcs, lengths }
    }

    /// Number of kept arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// All kept arcs.
    pub fn arcs(&self) -> &[(usize, usize)] {
        &self.arcs
    }

    /// Returns `true` if the directed arc survived pruning.
    pub fn contains(&self, from: usize, to: usize) -> bool {
        self.arcs.contains(&(from, to))
    }

    /// Stored length of the arc (never zero), if kept.
    pub fn length(&self, from: usize, to: usize) -> Option<f64> {
        self.arcs
            .iter()
            .position(|&a| a == (from, to))
            .map(|i| self.lengths[i])
    }

    /// Draws up to `amount` distinct arcs, shorter arcs more likely.
    pub fn sample<R: Rng + ?Sized>(&self, amount: usize, rng: &mut R) -> Result<Vec<(usize, usize)>> {
        let weights: Vec<f64> = self.lengths.iter().map(|&d| 1.0 / d).collect();
        Ok(weighted_sample(&weights, amount, rng)?
            .into_iter()
            .map(|i| self.arcs[i])
            .collect())
    }
}
