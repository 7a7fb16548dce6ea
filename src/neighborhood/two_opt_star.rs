//! Two-opt*: inter-route tail exchange.
//!
//! # Algorithm
//!
//! Route `i` keeps its visits up to index `p` and continues with route `j`'s
//! visits after `q`; route `j` keeps its visits up to `q` and continues with
//! route `i`'s tail.
//!
//! # Reference
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1995). "An Exchange Heuristic for
//! Routeing Problems with Time Windows". *JORS* 46(12), 1433-1446.

use super::{drop_emptied, predecessor_slots, successor_slots, MoveSignature, Neighbor};
use crate::models::{Model, Route, Solution};

/// Swaps the tails after index `p` of route `i` and after index `q` of
/// route `j`.
///
/// `p` and `q` may point at a route's starting depot but not at its final
/// one. Routes left empty are dropped.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Route, Solution};
/// use u_evrp::neighborhood::two_opt_star;
///
/// let sol = Solution::new(vec![
///     Route::from_visits(vec![0, 1, 2, 0]),
///     Route::from_visits(vec![0, 3, 4, 0]),
/// ]);
/// let s = two_opt_star(&sol, 0, 1, 1, 1);
/// assert_eq!(s.routes()[0].visits(), &[0, 1, 4, 0]);
/// assert_eq!(s.routes()[1].visits(), &[0, 3, 2, 0]);
/// ```
pub fn two_opt_star(solution: &Solution, i: usize, p: usize, j: usize, q: usize) -> Solution {
    debug_assert_ne!(i, j, "two-opt* needs two routes");
    let vi = solution.routes()[i].visits();
    let vj = solution.routes()[j].visits();
    debug_assert!(p + 1 < vi.len() && q + 1 < vj.len());

    let new_i: Vec<usize> = vi[..=p].iter().chain(&vj[q + 1..]).copied().collect();
    let new_j: Vec<usize> = vj[..=q].iter().chain(&vi[p + 1..]).copied().collect();

    let mut result = solution.clone();
    let routes = result.routes_mut();
    routes[i] = Route::from_visits(new_i);
    routes[j] = Route::from_visits(new_j);
    drop_emptied(routes, &[i, j]);
    result
}

/// All two-opt* moves that make `b` directly follow `a` across two routes.
pub fn two_opt_star_moves(solution: &Solution, model: &Model, a: usize, b: usize) -> Vec<Neighbor> {
    let mut out = Vec::new();
    for (i, p) in predecessor_slots(solution, model, a) {
        if p + 1 >= solution.routes()[i].len() {
            continue;
        }
        for (j, qb) in successor_slots(solution, model, b) {
            if i == j || qb == 0 {
                continue;
            }
            let q = qb - 1;
            out.push(Neighbor {
                solution: two_opt_star(solution, i, p, j, q),
                signature: MoveSignature::TwoOptStar {
                    route_a: i,
                    pos_a: p,
                    route_b: j,
                    pos_b: q,
                },
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, Vehicle};

    fn model() -> Model {
        Model::new(
            Node::depot(0.0, 0.0),
            (1..=4).map(|i| Node::customer(i as f64, 0.0, 1.0, 0.0)).collect(),
            vec![],
            Vehicle::new(100.0, 100.0, 1.0),
            2,
        )
        .expect("valid model")
    }

    #[test]
    fn test_emptied_route_dropped() {
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 1, 0]),
            Route::from_visits(vec![0, 2, 3, 0]),
        ]);
        // route 0 keeps only its depot and takes 1's empty tail
        let s = two_opt_star(&sol, 0, 0, 1, 2);
        assert_eq!(s.num_routes(), 1);
        assert_eq!(s.routes()[0].visits(), &[0, 2, 3, 1, 0]);
    }

    #[test]
    fn test_input_untouched() {
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 1, 2, 0]),
            Route::from_visits(vec![0, 3, 4, 0]),
        ]);
        let before = sol.clone();
        let _ = two_opt_star(&sol, 0, 0, 1, 2);
        assert_eq!(sol, before);
    }

    #[test]
    fn test_arc_moves_link_a_to_b() {
        let m = model();
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 1, 2, 0]),
            Route::from_visits(vec![0, 3, 4, 0]),
        ]);
        let moves = two_opt_star_moves(&sol, &m, 1, 4);
        assert_eq!(moves.len(), 1);
        let s = &moves[0].solution;
        assert_eq!(s.routes()[0].visits(), &[0, 1, 4, 0]);
        assert!(s.serves_all_customers(&m));
    }

    #[test]
    fn test_arc_moves_from_depot() {
        let m = model();
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 1, 2, 0]),
            Route::from_visits(vec![0, 3, 4, 0]),
        ]);
        // depot -> 4: the depot starts both routes, only route 0 can take 4
        let moves = two_opt_star_moves(&sol, &m, 0, 4);
        assert_eq!(moves.len(), 1);
        assert!(moves.iter().all(|n| n.solution.serves_all_customers(&m)));
        // same route pairs never generate a move
        assert!(two_opt_star_moves(&sol, &m, 1, 2).is_empty());
    }
}
