//! Randomized sweep with cheapest insertion.
//!
//! # Algorithm
//!
//! Draws a random pivot inside the map's bounding box and orders customers
//! by the angle, at the depot, between the pivot and the customer. Customers
//! are then inserted one by one into the route under construction at the
//! cheapest slot that respects the ready-time order of its neighbours. When
//! the insertion breaks the admission constraints the route is closed and a
//! new one is opened; once the route cap is reached every remaining
//! customer is forced into the last route.
//!
//! # Complexity
//!
//! O(n² log n) where n = number of customers (slot ranking per insertion).
//!
//! # Reference
//!
//! Gillett, B.E. & Miller, L.R. (1974). "A Heuristic Algorithm for the
//! Vehicle-Dispatch Problem", *Operations Research* 22(2), 340-349.

use std::f64::consts::TAU;

use rand::Rng;

use crate::models::{Model, Route, Solution};

/// Constraints a route must keep for a customer to be admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Load and battery must hold; time windows are left to the search.
    CapacityAndBattery,
    /// Load and time windows must hold; batteries are left to the repair.
    CapacityAndTime,
}

impl Admission {
    fn admits(self, route: &Route, model: &Model) -> bool {
        route.is_capacity_feasible(model)
            && match self {
                Admission::CapacityAndBattery => route.is_battery_feasible(model),
                Admission::CapacityAndTime => route.is_time_feasible(model),
            }
    }
}

/// Counter-clockwise angle at `origin` from the ray towards `a` to the ray
/// towards `b`, in `[0, 2π)`.
///
/// # Examples
///
/// ```
/// use u_evrp::constructive::angle_between;
///
/// let quarter = angle_between((0.0, 0.0), (1.0, 0.0), (0.0, 1.0));
/// assert!((quarter - std::f64::consts::FRAC_PI_2).abs() < 1e-10);
/// let three_quarters = angle_between((0.0, 0.0), (0.0, 1.0), (1.0, 0.0));
/// assert!((three_quarters - 3.0 * std::f64::consts::FRAC_PI_2).abs() < 1e-10);
/// ```
pub fn angle_between(origin: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let ta = (a.1 - origin.1).atan2(a.0 - origin.0);
    let tb = (b.1 - origin.1).atan2(b.0 - origin.0);
    (tb - ta).rem_euclid(TAU)
}

/// Builds a solution by sweeping customers around a random pivot.
///
/// `route_cap` bounds the number of routes; `None` opens routes freely.
///
/// # Examples
///
/// ```
/// use u_evrp::constructive::{random_sweep, Admission};
/// use u_evrp::models::{Model, Node, Vehicle};
/// use u_evrp::random::create_rng;
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![
///         Node::customer(1.0, 1.0, 10.0, 0.0),
///         Node::customer(-1.0, 1.0, 10.0, 0.0),
///         Node::customer(-1.0, -1.0, 10.0, 0.0),
///         Node::customer(1.0, -1.0, 10.0, 0.0),
///     ],
///     vec![],
///     Vehicle::new(20.0, 100.0, 1.0),
///     4,
/// )
/// .unwrap();
///
/// let mut rng = create_rng(42);
/// let sol = random_sweep(&model, Admission::CapacityAndTime, None, &mut rng);
/// assert!(sol.serves_all_customers(&model));
/// assert!(sol.is_capacity_feasible(&model));
/// ```
pub fn random_sweep<R: Rng + ?Sized>(
    model: &Model,
    admission: Admission,
    route_cap: Option<usize>,
    rng: &mut R,
) -> Solution {
    let bounds = model.map_bounds();
    let draw = |lo: f64, hi: f64, rng: &mut R| {
        if hi > lo {
            rng.random_range(lo..hi)
        } else {
            lo
        }
    };
    let pivot = (
        draw(bounds.min_x, bounds.max_x, &mut *rng),
        draw(bounds.min_y, bounds.max_y, &mut *rng),
    );
    let depot = model.depot();
    let origin = (depot.x(), depot.y());

    let mut order: Vec<(usize, f64)> = model
        .customers()
        .iter()
        .map(|&c| {
            let node = model.node(c);
            (c, angle_between(origin, pivot, (node.x(), node.y())))
        })
        .collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut closed: Vec<Route> = Vec::new();
    let mut current = Route::new(Model::DEPOT);
    let mut next = 0;
    while next < order.len() {
        let customer = order[next].0;
        let mut trial = current.clone();
        trial.insert(sweep_slot(model, current.visits(), customer), customer);

        let at_cap = route_cap.is_some_and(|cap| closed.len() + 1 >= cap);
        if current.is_empty() || at_cap || admission.admits(&trial, model) {
            current = trial;
            next += 1;
        } else {
            closed.push(std::mem::replace(&mut current, Route::new(Model::DEPOT)));
        }
    }
    if !current.is_empty() || closed.is_empty() {
        closed.push(current);
    }
    Solution::new(closed)
}

/// Cheapest slot whose neighbours keep ready times in order, or the
/// cheapest slot outright.
fn sweep_slot(model: &Model, visits: &[usize], customer: usize) -> usize {
    let ready = model.node(customer).ready_time();
    let mut slots: Vec<(usize, f64)> = (1..visits.len())
        .map(|pos| {
            let (prev, next) = (visits[pos - 1], visits[pos]);
            let added = model.distance(prev, customer) + model.distance(customer, next)
                - model.distance(prev, next);
            (pos, added)
        })
        .collect();
    slots.sort_by(|a, b| a.1.total_cmp(&b.1));

    let in_order = |pos: usize| {
        let prev = model.node(visits[pos - 1]);
        let next = model.node(visits[pos]);
        let after_prev = !prev.is_customer() || prev.ready_time() <= ready;
        let before_next = !next.is_customer() || ready <= next.ready_time();
        after_prev && before_next
    };
    slots
        .iter()
        .find(|&&(pos, _)| in_order(pos))
        .or_else(|| slots.first())
        .map_or(1, |&(pos, _)| pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, TimeWindow, Vehicle};
    use crate::random::create_rng;

    fn ring(n: usize, demand: f64, capacity: f64, max_vehicles: usize) -> Model {
        Model::new(
            Node::depot(0.0, 0.0),
            (0..n)
                .map(|i| {
                    let t = TAU * i as f64 / n as f64;
                    Node::customer(10.0 * t.cos(), 10.0 * t.sin(), demand, 0.0)
                })
                .collect(),
            vec![],
            Vehicle::new(capacity, 1000.0, 1.0),
            max_vehicles,
        )
        .expect("valid model")
    }

    #[test]
    fn test_capacity_splits_routes() {
        let m = ring(8, 10.0, 30.0, 8);
        let mut rng = create_rng(1);
        for _ in 0..10 {
            let sol = random_sweep(&m, Admission::CapacityAndTime, None, &mut rng);
            assert!(sol.serves_all_customers(&m));
            assert!(sol.is_capacity_feasible(&m));
            assert!(sol.num_routes() >= 3);
        }
    }

    #[test]
    fn test_route_cap_forces_last_route() {
        let m = ring(8, 10.0, 30.0, 2);
        let mut rng = create_rng(2);
        let sol = random_sweep(&m, Admission::CapacityAndBattery, Some(2), &mut rng);
        assert!(sol.serves_all_customers(&m));
        assert_eq!(sol.num_routes(), 2);
        assert!(!sol.is_capacity_feasible(&m));
    }

    #[test]
    fn test_same_seed_same_solution() {
        let m = ring(10, 10.0, 30.0, 10);
        let a = random_sweep(&m, Admission::CapacityAndTime, None, &mut create_rng(9));
        let b = random_sweep(&m, Admission::CapacityAndTime, None, &mut create_rng(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_slot_respects_ready_order() {
        let m = Model::new(
            Node::depot(0.0, 0.0),
            vec![
                Node::customer(1.0, 0.0, 1.0, 0.0)
                    .with_time_window(TimeWindow::new(10.0, 100.0).expect("valid")),
                Node::customer(2.0, 0.0, 1.0, 0.0)
                    .with_time_window(TimeWindow::new(5.0, 100.0).expect("valid")),
                Node::customer(3.0, 0.0, 1.0, 0.0)
                    .with_time_window(TimeWindow::new(20.0, 100.0).expect("valid")),
            ],
            vec![],
            Vehicle::new(10.0, 100.0, 1.0),
            1,
        )
        .expect("valid model");
        // between 1 and 3 is free, but 2 is ready before 1
        assert_eq!(sweep_slot(&m, &[0, 1, 3, 0], 2), 1);
    }
}
