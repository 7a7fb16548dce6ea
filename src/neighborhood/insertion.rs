//! Cheapest insertion by added distance.

use crate::models::{Model, Route, Solution};

/// Finds the `(route, index, added_distance)` slot among `candidates` that
/// adds the least distance when `node` is inserted there.
///
/// Ties keep the first slot found. Returns `None` when `candidates` is
/// empty.
pub fn cheapest_insertion(
    solution: &Solution,
    model: &Model,
    node: usize,
    candidates: &[usize],
) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for &r in candidates {
        let visits = solution.routes()[r].visits();
        for pos in 1..visits.len() {
            let (prev, next) = (visits[pos - 1], visits[pos]);
            let added =
                model.distance(prev, node) + model.distance(node, next) - model.distance(prev, next);
            if best.map_or(true, |(_, _, b)| added < b) {
                best = Some((r, pos, added));
            }
        }
    }
    best
}

/// Inserts `node` at its cheapest slot over all routes, opening a new route
/// if the solution has none.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Route, Solution, Vehicle};
/// use u_evrp::neighborhood::insert_cheapest;
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![Node::customer(1.0, 0.0, 1.0, 0.0), Node::customer(2.0, 0.0, 1.0, 0.0)],
///     vec![],
///     Vehicle::new(10.0, 100.0, 1.0),
///     1,
/// )
/// .unwrap();
///
/// let mut sol = Solution::new(vec![Route::from_visits(vec![0, 2, 0])]);
/// insert_cheapest(&mut sol, &model, 1);
/// assert_eq!(sol.routes()[0].visits(), &[0, 1, 2, 0]);
/// ```
pub fn insert_cheapest(solution: &mut Solution, model: &Model, node: usize) {
    let all: Vec<usize> = (0..solution.num_routes()).collect();
    match cheapest_insertion(solution, model, node, &all) {
        Some((r, pos, _)) => solution.routes_mut()[r].insert(pos, node),
        None => solution
            .routes_mut()
            .push(Route::from_visits(vec![Model::DEPOT, node, Model::DEPOT])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, Vehicle};

    #[test]
    fn test_picks_route_with_least_detour() {
        let m = Model::new(
            Node::depot(0.0, 0.0),
            vec![
                Node::customer(10.0, 0.0, 1.0, 0.0),
                Node::customer(0.0, 10.0, 1.0, 0.0),
                Node::customer(0.0, 11.0, 1.0, 0.0),
            ],
            vec![],
            Vehicle::new(10.0, 100.0, 1.0),
            2,
        )
        .expect("valid model");
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 1, 0]),
            Route::from_visits(vec![0, 2, 0]),
        ]);
        let (r, pos, added) = cheapest_insertion(&sol, &m, 3, &[0, 1]).expect("slot");
        // both slots of route 1 add 2; the first wins
        assert_eq!((r, pos), (1, 1));
        assert!((added - 2.0).abs() < 1e-10);
        assert_eq!(cheapest_insertion(&sol, &m, 3, &[]), None);
    }

    #[test]
    fn test_opens_route_when_none() {
        let m = Model::new(
            Node::depot(0.0, 0.0),
            vec![Node::customer(1.0, 0.0, 1.0, 0.0)],
            vec![],
            Vehicle::new(10.0, 100.0, 1.0),
            1,
        )
        .expect("valid model");
        let mut sol = Solution::default();
        insert_cheapest(&mut sol, &m, 1);
        assert_eq!(sol.routes()[0].visits(), &[0, 1, 0]);
    }
}
