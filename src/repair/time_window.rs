//! Time-window repair by moving one customer out of a late route.

use crate::evaluation::first_late_arrival;
use crate::models::{Model, Route, Solution};

/// Moves one customer out of the first route with a late arrival.
///
/// The latest customer at or before the first late visit is removed and
/// reinserted at the cheapest slot of another route that stays capacity-
/// and time-feasible; if there is none it gets a route of its own. Returns
/// an unchanged copy when every route is on time.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Route, Solution, TimeWindow, Vehicle};
/// use u_evrp::repair::fix_time_windows;
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![
///         Node::customer(5.0, 0.0, 1.0, 0.0),
///         Node::customer(0.0, 5.0, 1.0, 0.0)
///             .with_time_window(TimeWindow::new(0.0, 6.0).unwrap()),
///     ],
///     vec![],
///     Vehicle::new(10.0, 100.0, 1.0),
///     2,
/// )
/// .unwrap();
///
/// let sol = Solution::new(vec![Route::from_visits(vec![0, 1, 2, 0])]);
/// let fixed = fix_time_windows(&sol, &model);
/// assert_eq!(fixed.num_routes(), 2);
/// assert!(fixed.is_time_feasible(&model));
/// ```
pub fn fix_time_windows(solution: &Solution, model: &Model) -> Solution {
    let mut result = solution.clone();
    let late = solution
        .routes()
        .iter()
        .enumerate()
        .find_map(|(r, route)| first_late_arrival(route, model).map(|(pos, _)| (r, pos)));
    let Some((r, late_pos)) = late else {
        return result;
    };
    let visits = solution.routes()[r].visits();
    let Some(k) = (1..=late_pos.min(visits.len() - 2))
        .rev()
        .find(|&k| model.node(visits[k]).is_customer())
    else {
        return result;
    };
    let node = visits[k];

    let routes = result.routes_mut();
    routes[r].remove(k);
    let source = if routes[r].is_empty() {
        routes.remove(r);
        None
    } else {
        Some(r)
    };

    let mut best: Option<(usize, usize, f64)> = None;
    for (i, route) in routes.iter().enumerate() {
        if Some(i) == source {
            continue;
        }
        let v = route.visits();
        for pos in 1..v.len() {
            let added = model.distance(v[pos - 1], node) + model.distance(node, v[pos])
                - model.distance(v[pos - 1], v[pos]);
            if best.is_some_and(|(_, _, b)| b <= added) {
                continue;
            }
            let mut trial = v.to_vec();
            trial.insert(pos, node);
            let trial = Route::from_visits(trial);
            if trial.is_capacity_feasible(model) && trial.is_time_feasible(model) {
                best = Some((i, pos, added));
            }
        }
    }

    match best {
        Some((i, pos, _)) => routes[i].insert(pos, node),
        None => routes.push(Route::from_visits(vec![Model::DEPOT, node, Model::DEPOT])),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, TimeWindow, Vehicle};

    fn model() -> Model {
        Model::new(
            Node::depot(0.0, 0.0),
            vec![
                Node::customer(5.0, 0.0, 1.0, 1.0),
                Node::customer(10.0, 0.0, 1.0, 0.0)
                    .with_time_window(TimeWindow::new(0.0, 10.0).expect("valid")),
                Node::customer(0.0, 5.0, 1.0, 0.0),
            ],
            vec![],
            Vehicle::new(10.0, 100.0, 1.0),
            3,
        )
        .expect("valid model")
    }

    #[test]
    fn test_on_time_is_unchanged() {
        let m = model();
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 3, 0]),
            Route::from_visits(vec![0, 2, 1, 0]),
        ]);
        assert_eq!(fix_time_windows(&sol, &m), sol);
    }

    #[test]
    fn test_moves_late_customer_to_other_route() {
        let m = model();
        // customer 2 reached at 11, due at 10
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 1, 2, 0]),
            Route::from_visits(vec![0, 3, 0]),
        ]);
        let fixed = fix_time_windows(&sol, &m);
        assert!(fixed.serves_all_customers(&m));
        assert_eq!(fixed.routes()[0].visits(), &[0, 1, 0]);
        // only the front of route 1 is reached in time
        assert_eq!(fixed.routes()[1].visits(), &[0, 2, 3, 0]);
        assert_eq!(fixed.num_routes(), 2);
        assert!(fixed.is_time_feasible(&m));
    }
}
