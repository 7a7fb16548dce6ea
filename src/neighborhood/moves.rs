//! Arc-driven neighbourhood generation for tabu search.

use super::{exchange_moves, relocate_moves, station_moves, two_opt_star_moves, MoveSignature};
use crate::models::{Model, Solution};

/// A neighbouring solution and the move that produced it.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub solution: Solution,
    pub signature: MoveSignature,
}

/// Every two-opt*, relocate, exchange and station move that makes `to`
/// directly follow `from`.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Route, Solution, Vehicle};
/// use u_evrp::neighborhood::arc_moves;
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
///     2,
/// )
/// .unwrap();
///
/// let sol = Solution::new(vec![
///     Route::from_visits(vec![0, 1, 3, 0]),
///     Route::from_visits(vec![0, 2, 0]),
/// ]);
/// let moves = arc_moves(&sol, &model, (1, 2));
/// assert!(!moves.is_empty());
/// assert!(moves.iter().all(|n| n.solution.serves_all_customers(&model)));
/// ```
pub fn arc_moves(solution: &Solution, model: &Model, (from, to): (usize, usize)) -> Vec<Neighbor> {
    let mut out = two_opt_star_moves(solution, model, from, to);
    out.extend(relocate_moves(solution, model, from, to));
    out.extend(exchange_moves(solution, model, from, to));
    out.extend(station_moves(solution, model, from, to));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, Route, Vehicle};
    use crate::neighborhood::CandidateArcIndex;
    use crate::random::create_rng;
    use proptest::prelude::*;
    use rand::Rng;

    fn line_model(customers: usize, stations: usize) -> Model {
        Model::new(
            Node::depot(0.0, 0.0),
            (0..customers)
                .map(|i| Node::customer((i % 5) as f64 * 3.0, (i / 5) as f64 * 2.0 + 1.0, 1.0, 0.0))
                .collect(),
            (0..stations)
                .map(|i| Node::recharger(i as f64 * 4.0, -2.0))
                .collect(),
            Vehicle::new(100.0, 1000.0, 1.0),
            customers,
        )
        .expect("valid model")
    }

    /// Deals customers round-robin into `routes` routes and sprinkles the
    /// stations in.
    fn dealt(model: &Model, routes: usize, seed: u64) -> Solution {
        let mut rng = create_rng(seed);
        let mut visits: Vec<Vec<usize>> = vec![vec![0]; routes];
        for (k, &c) in model.customers().iter().enumerate() {
            visits[k % routes].push(c);
        }
        for &s in model.rechargers() {
            let r = rng.random_range(0..routes);
            let pos = rng.random_range(1..=visits[r].len());
            visits[r].insert(pos, s);
        }
        Solution::new(
            visits
                .into_iter()
                .map(|mut v| {
                    v.push(0);
                    Route::from_visits(v)
                })
                .collect(),
        )
    }

    proptest! {
        #[test]
        fn prop_arc_moves_keep_customers(
            customers in 2usize..9,
            stations in 0usize..3,
            routes in 1usize..4,
            seed in 0u64..1000,
        ) {
            let m = line_model(customers, stations);
            let sol = dealt(&m, routes.min(customers), seed);
            prop_assert!(sol.serves_all_customers(&m));
            let arcs = CandidateArcIndex::build(&m);
            let mut rng = create_rng(seed);
            for arc in arcs.sample(20, &mut rng).expect("positive lengths") {
                for n in arc_moves(&sol, &m, arc) {
                    prop_assert!(n.solution.serves_all_customers(&m), "{:?} broke {}", n.signature, n.solution);
                    prop_assert!(n.solution.routes().iter().all(|r| r.visits()[0] == 0));
                }
            }
        }

        #[test]
        fn prop_random_operators_keep_customers(
            customers in 2usize..9,
            stations in 0usize..3,
            routes in 1usize..4,
            seed in 0u64..1000,
        ) {
            let m = line_model(customers, stations);
            let sol = dealt(&m, routes.min(customers), seed);
            let mut rng = create_rng(seed);
            let shaken = crate::neighborhood::cyclic_exchange(&sol, 3, 3, &mut rng);
            prop_assert!(shaken.serves_all_customers(&m));
            let swapped = crate::neighborhood::exchange_random(&shaken, &m, &mut rng);
            prop_assert!(swapped.serves_all_customers(&m));
            let moved = crate::neighborhood::station_in_route_random(&swapped, &m, &mut rng);
            prop_assert!(moved.serves_all_customers(&m));
            let r = rng.random_range(0..moved.num_routes());
            if !moved.routes()[r].is_empty() {
                let p = rng.random_range(1..moved.routes()[r].len() - 1);
                let relocated = crate::neighborhood::relocate_random(&moved, r, p, &mut rng);
                prop_assert!(relocated.serves_all_customers(&m));
            }
            let child = crate::neighborhood::aco_gm_cross1(&sol, &m, &mut rng);
            prop_assert!(child.serves_all_customers(&m));
            let child = crate::neighborhood::aco_gm_cross2(&sol, &shaken, &m);
            prop_assert!(child.serves_all_customers(&m));
        }
    }
}
