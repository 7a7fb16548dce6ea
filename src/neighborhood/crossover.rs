//! Route-dissolving crossovers and arc-overlap diversity.
//!
//! # Algorithm
//!
//! - `cross1` dissolves one route, picked by roulette on the inverse of its
//!   average arc length, and reinserts its customers at their cheapest slots
//!   among the remaining routes.
//! - `cross2` borrows the shortest route of a second parent: its customers
//!   are removed from the first parent and reinserted at their cheapest
//!   slots.
//!
//! Rechargers on dissolved routes are not carried over; the charging repair
//! puts stations back where they are needed.

use std::collections::HashSet;

use rand::Rng;

use super::{cheapest_insertion, drop_emptied, insert_cheapest, DISTANCE_EPSILON};
use crate::models::{Model, Solution};
use crate::random::roulette_select;

/// Dissolves one route of `solution` and reinserts its customers.
///
/// Returns an unchanged copy when there is at most one route.
pub fn aco_gm_cross1<R: Rng + ?Sized>(solution: &Solution, model: &Model, rng: &mut R) -> Solution {
    if solution.num_routes() <= 1 {
        return solution.clone();
    }
    let weights: Vec<f64> = solution
        .routes()
        .iter()
        .map(|r| 1.0 / r.average_distance(model).max(DISTANCE_EPSILON))
        .collect();
    let dissolved = roulette_select(&weights, rng);

    let mut result = solution.clone();
    let removed = result.routes_mut().remove(dissolved);
    let remaining: Vec<usize> = (0..result.num_routes()).collect();
    for &node in removed.inner() {
        if !model.node(node).is_customer() {
            continue;
        }
        if let Some((r, pos, _)) = cheapest_insertion(&result, model, node, &remaining) {
            result.routes_mut()[r].insert(pos, node);
        }
    }
    result
}

/// Copies the shortest customer route of `donor` into `parent` by removing
/// its customers and reinserting them at their cheapest slots.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Route, Solution, Vehicle};
/// use u_evrp::neighborhood::aco_gm_cross2;
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![
///         Node::customer(1.0, 0.0, 1.0, 0.0),
///         Node::customer(5.0, 0.0, 1.0, 0.0),
///         Node::customer(0.0, 5.0, 1.0, 0.0),
///     ],
///     vec![],
///     Vehicle::new(10.0, 100.0, 1.0),
///     3,
/// )
/// .unwrap();
///
/// let parent = Solution::new(vec![
///     Route::from_visits(vec![0, 1, 3, 0]),
///     Route::from_visits(vec![0, 2, 0]),
/// ]);
/// let donor = Solution::new(vec![
///     Route::from_visits(vec![0, 1, 0]),
///     Route::from_visits(vec![0, 2, 3, 0]),
/// ]);
/// let child = aco_gm_cross2(&parent, &donor, &model);
/// assert!(child.serves_all_customers(&model));
/// ```
pub fn aco_gm_cross2(parent: &Solution, donor: &Solution, model: &Model) -> Solution {
    let borrowed = donor
        .routes()
        .iter()
        .filter(|r| r.has_customers(model))
        .min_by(|a, b| a.distance(model).total_cmp(&b.distance(model)));
    let Some(borrowed) = borrowed else {
        return parent.clone();
    };
    let customers: Vec<usize> = borrowed
        .inner()
        .iter()
        .copied()
        .filter(|&v| model.node(v).is_customer())
        .collect();

    let mut result = parent.clone();
    for &node in &customers {
        let slot = result
            .routes()
            .iter()
            .enumerate()
            .find_map(|(i, r)| r.position_of(node).map(|p| (i, p)));
        if let Some((i, p)) = slot {
            let routes = result.routes_mut();
            routes[i].remove(p);
            drop_emptied(routes, &[i]);
        }
    }
    for &node in &customers {
        insert_cheapest(&mut result, model, node);
    }
    result
}

/// Share of arcs two solutions have in common, in `[0, 1]`.
///
/// Counts every arc of `a` that also appears in `b` twice (once per side)
/// over the total number of arcs.
pub fn overlap_degree(a: &Solution, b: &Solution) -> f64 {
    let in_b: HashSet<(usize, usize)> = b.arcs().collect();
    let (mut shared, mut total_a) = (0usize, 0usize);
    for arc in a.arcs() {
        total_a += 1;
        if in_b.contains(&arc) {
            shared += 1;
        }
    }
    let total = total_a + b.arcs().count();
    if total == 0 {
        return 0.0;
    }
    2.0 * shared as f64 / total as f64
}

/// Mean [`overlap_degree`] of `solution` against every member of
/// `population`.
pub fn mean_overlap(solution: &Solution, population: &[Solution]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    population
        .iter()
        .map(|p| overlap_degree(solution, p))
        .sum::<f64>()
        / population.len() as f64
}
