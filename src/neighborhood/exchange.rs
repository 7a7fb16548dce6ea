//! Exchange: swap two customer visits, in the same route or across routes.

use rand::seq::index;
use rand::Rng;

use super::{inner_slots, predecessor_slots, successor_slots, MoveSignature, Neighbor};
use crate::models::{Model, Solution};

/// Swaps the visits at `(route, index)` slots `first` and `second`.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Route, Solution};
/// use u_evrp::neighborhood::exchange;
///
/// let sol = Solution::new(vec![
///     Route::from_visits(vec![0, 1, 2, 0]),
///     Route::from_visits(vec![0, 3, 0]),
/// ]);
/// let s = exchange(&sol, (0, 2), (1, 1));
/// assert_eq!(s.routes()[0].visits(), &[0, 1, 3, 0]);
/// assert_eq!(s.routes()[1].visits(), &[0, 2, 0]);
/// ```
pub fn exchange(solution: &Solution, first: (usize, usize), second: (usize, usize)) -> Solution {
    let mut result = solution.clone();
    let a = solution.routes()[first.0].visits()[first.1];
    let b = solution.routes()[second.0].visits()[second.1];
    let routes = result.routes_mut();
    routes[first.0].visits_mut()[first.1] = b;
    routes[second.0].visits_mut()[second.1] = a;
    result
}

/// Swaps two randomly chosen customer visits.
///
/// Returns an unchanged copy when fewer than two customers are routed.
pub fn exchange_random<R: Rng + ?Sized>(solution: &Solution, model: &Model, rng: &mut R) -> Solution {
    let slots: Vec<(usize, usize)> = solution
        .routes()
        .iter()
        .enumerate()
        .flat_map(|(i, r)| {
            r.inner()
                .iter()
                .enumerate()
                .filter(|&(_, &v)| model.node(v).is_customer())
                .map(move |(k, _)| (i, k + 1))
        })
        .collect();
    if slots.len() < 2 {
        return solution.clone();
    }
    let picked = index::sample(rng, slots.len(), 2);
    exchange(solution, slots[picked.index(0)], slots[picked.index(1)])
}

/// Exchanges that make `b` directly follow `a`: `b` swapped with `a`'s
/// successor, or `a` swapped with `b`'s predecessor. Only customers move.
pub fn exchange_moves(solution: &Solution, model: &Model, a: usize, b: usize) -> Vec<Neighbor> {
    let is_customer = |v: usize| model.node(v).is_customer();
    let mut out = Vec::new();

    if is_customer(b) {
        for (i, p) in predecessor_slots(solution, model, a) {
            let visits = solution.routes()[i].visits();
            let Some(&succ) = visits.get(p + 1) else {
                continue;
            };
            if succ == b || !is_customer(succ) {
                continue;
            }
            for (j, q) in inner_slots(solution, b) {
                out.push(Neighbor {
                    solution: exchange(solution, (i, p + 1), (j, q)),
                    signature: MoveSignature::exchange(succ, b),
                });
            }
        }
    }

    if is_customer(a) {
        for (j, q) in successor_slots(solution, model, b) {
            if q == 0 {
                continue;
            }
            let pred = solution.routes()[j].visits()[q - 1];
            if pred == a || !is_customer(pred) {
                continue;
            }
            for (i, p) in inner_slots(solution, a) {
                out.push(Neighbor {
                    solution: exchange(solution, (i, p), (j, q - 1)),
                    signature: MoveSignature::exchange(a, pred),
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, Route, Vehicle};
    use crate::random::create_rng;

    fn model() -> Model {
        Model::new(
            Node::depot(0.0, 0.0),
            (1..=4).map(|i| Node::customer(i as f64, 0.0, 1.0, 0.0)).collect(),
            vec![Node::recharger(0.0, 1.0)],
            Vehicle::new(100.0, 100.0, 1.0),
            2,
        )
        .expect("valid model")
    }

    #[test]
    fn test_random_never_moves_stations() {
        let m = model();
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 1, 5, 2, 0]),
            Route::from_visits(vec![0, 3, 4, 0]),
        ]);
        let mut rng = create_rng(8);
        for _ in 0..100 {
            let s = exchange_random(&sol, &m, &mut rng);
            assert!(s.serves_all_customers(&m));
            assert_eq!(s.routes()[0].visits()[2], 5);
        }
    }

    #[test]
    fn test_random_too_few_customers() {
        let m = model();
        let sol = Solution::new(vec![Route::from_visits(vec![0, 5, 1, 0])]);
        let mut rng = create_rng(8);
        assert_eq!(exchange_random(&sol, &m, &mut rng), sol);
    }

    #[test]
    fn test_arc_moves() {
        let m = model();
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 1, 2, 0]),
            Route::from_visits(vec![0, 3, 4, 0]),
        ]);
        let moves = exchange_moves(&sol, &m, 1, 4);
        // 4 <-> 2 gives 1 -> 4; 1 <-> 3 gives 1 -> 4 as well
        assert_eq!(moves.len(), 2);
        for n in &moves {
            assert!(n.solution.arcs().any(|arc| arc == (1, 4)));
        }
        assert_eq!(moves[0].signature, MoveSignature::exchange(2, 4));
        assert_eq!(moves[1].signature, MoveSignature::exchange(1, 3));
    }

    #[test]
    fn test_arc_moves_skip_stations() {
        let m = model();
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 1, 5, 0]),
            Route::from_visits(vec![0, 2, 0]),
        ]);
        // 1's successor is a station and 2's predecessor is the depot
        assert!(exchange_moves(&sol, &m, 1, 2).is_empty());
    }
}
