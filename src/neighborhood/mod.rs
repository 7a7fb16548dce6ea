//! Structural moves over EVRP solutions.
//!
//! Every operator takes a `&Solution` and returns a new one; inputs are never
//! mutated. Routes touched by a move that end up holding only their depot
//! endpoints are dropped.
//!
//! - [`CandidateArcIndex`]: pruned directed node pairs used to drive the
//!   tabu neighbourhood
//! - [`cyclic_exchange`]: shake: rotate random segments among routes
//! - [`two_opt_star`]: swap the tails of two routes
//! - [`relocate`] / [`relocate_random`]: move one visit
//! - [`exchange`] / [`exchange_random`]: swap two customer visits
//! - [`move_station`] / [`station_in_route_random`]: move a recharger
//!   within its route
//! - [`aco_gm_cross1`] / [`aco_gm_cross2`]: dissolve-and-reinsert crossovers
//! - [`arc_moves`]: every move that makes one node directly follow another

mod candidate_arcs;
mod crossover;
mod exchange;
mod insertion;
mod moves;
mod relocate;
mod shake;
mod signature;
mod station;
mod two_opt_star;

pub use candidate_arcs::CandidateArcIndex;
pub use crossover::{aco_gm_cross1, aco_gm_cross2, mean_overlap, overlap_degree};
pub use exchange::{exchange, exchange_moves, exchange_random};
pub use insertion::{cheapest_insertion, insert_cheapest};
pub use moves::{arc_moves, Neighbor};
pub use relocate::{relocate, relocate_moves, relocate_random};
pub use shake::cyclic_exchange;
pub use signature::MoveSignature;
pub use station::{move_station, station_in_route_random, station_moves};
pub use two_opt_star::{two_opt_star, two_opt_star_moves};

use crate::models::{Model, Route, Solution};

/// Stand-in for a zero distance wherever distances are inverted into weights.
pub const DISTANCE_EPSILON: f64 = 1e-7;

/// Removes the listed routes if they were left without inner visits.
pub(crate) fn drop_emptied(routes: &mut Vec<Route>, touched: &[usize]) {
    let mut touched: Vec<usize> = touched.to_vec();
    touched.sort_unstable();
    touched.dedup();
    for &i in touched.iter().rev() {
        if i < routes.len() && routes[i].is_empty() {
            routes.remove(i);
        }
    }
}

/// Slots `(route, index)` after which a node can be followed by another:
/// every route start for the depot, the inner occurrences otherwise.
pub(crate) fn predecessor_slots(solution: &Solution, model: &Model, node: usize) -> Vec<(usize, usize)> {
    if model.node(node).is_depot() {
        return (0..solution.num_routes()).map(|i| (i, 0)).collect();
    }
    inner_slots(solution, node)
}

/// Slots `(route, index)` a node can be preceded at: every route end for
/// the depot, the inner occurrences otherwise.
pub(crate) fn successor_slots(solution: &Solution, model: &Model, node: usize) -> Vec<(usize, usize)> {
    if model.node(node).is_depot() {
        return solution
            .routes()
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.len() - 1))
            .collect();
    }
    inner_slots(solution, node)
}

/// Inner occurrences of `node` as `(route, index)`.
pub(crate) fn inner_slots(solution: &Solution, node: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (i, route) in solution.routes().iter().enumerate() {
        for (k, &v) in route.inner().iter().enumerate() {
            if v == node {
                out.push((i, k + 1));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_emptied_only_touched() {
        let mut routes = vec![
            Route::new(0),
            Route::from_visits(vec![0, 1, 0]),
            Route::new(0),
        ];
        drop_emptied(&mut routes, &[2, 1]);
        assert_eq!(routes.len(), 2);
        assert!(routes[0].is_empty());
    }
}
