//! Penalized objective and the shared "better than" rule.

use serde::{Deserialize, Serialize};

use crate::models::{Model, Route, Solution};

/// The three constraints that are relaxed into penalties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    Capacity,
    Time,
    Battery,
}

impl Constraint {
    /// All constraints, in penalty-vector order.
    pub const ALL: [Constraint; 3] = [Constraint::Capacity, Constraint::Time, Constraint::Battery];
}

/// Penalty weights applied to capacity, time-window and battery violations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    pub capacity: f64,
    pub time: f64,
    pub battery: f64,
}

impl Penalty {
    pub fn new(capacity: f64, time: f64, battery: f64) -> Self {
        Self {
            capacity,
            time,
            battery,
        }
    }

    /// Same weight for every constraint.
    pub fn uniform(weight: f64) -> Self {
        Self::new(weight, weight, weight)
    }

    pub fn get(&self, constraint: Constraint) -> f64 {
        match constraint {
            Constraint::Capacity => self.capacity,
            Constraint::Time => self.time,
            Constraint::Battery => self.battery,
        }
    }

    pub fn set(&mut self, constraint: Constraint, value: f64) {
        match constraint {
            Constraint::Capacity => self.capacity = value,
            Constraint::Time => self.time = value,
            Constraint::Battery => self.battery = value,
        }
    }
}

/// Excess load: the departure load over capacity, plus the excess after
/// every pickup (negative-demand) visit.
///
/// `loads[0]` is the load leaving the depot, which is the peak of a
/// delivery-only route.
pub fn capacity_excess(loads: &[f64], demands: &[f64], capacity: f64) -> f64 {
    let Some(&departure) = loads.first() else {
        return 0.0;
    };
    let pickups: f64 = loads
        .iter()
        .zip(demands)
        .filter(|&(_, &d)| d < 0.0)
        .map(|(&load, _)| (load - capacity).max(0.0))
        .sum();
    (departure - capacity).max(0.0) + pickups
}

/// Index and amount of the first arrival after its deadline.
pub fn first_lateness(arrivals: &[f64], dues: &[f64]) -> Option<(usize, f64)> {
    arrivals
        .iter()
        .zip(dues)
        .position(|(&a, &d)| a > d)
        .map(|i| (i, arrivals[i] - dues[i]))
}

/// Sum of the magnitudes of all negative battery readings.
pub fn battery_deficit(batteries: &[f64]) -> f64 {
    batteries.iter().filter(|&&b| b < 0.0).map(|b| -b).sum()
}

/// Capacity violation of a route under the model's vehicle.
pub fn capacity_violation(route: &Route, model: &Model) -> f64 {
    let demands: Vec<f64> = route
        .visits()
        .iter()
        .map(|&v| model.node(v).demand())
        .collect();
    capacity_excess(&route.profile(model).loads, &demands, model.vehicle().capacity())
}

/// Position and lateness of the first late arrival on a route.
pub fn first_late_arrival(route: &Route, model: &Model) -> Option<(usize, f64)> {
    let dues: Vec<f64> = route
        .visits()
        .iter()
        .map(|&v| model.node(v).due_time())
        .collect();
    first_lateness(&route.profile(model).arrivals, &dues)
}

/// Time violation of a route: the lateness of its first late arrival.
pub fn time_violation(route: &Route, model: &Model) -> f64 {
    first_late_arrival(route, model).map_or(0.0, |(_, late)| late)
}

/// Battery violation of a route.
pub fn battery_violation(route: &Route, model: &Model) -> f64 {
    battery_deficit(&route.profile(model).batteries)
}

/// Computes penalized costs and compares solutions for one model.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Route, Solution, Vehicle};
/// use u_evrp::evaluation::{ObjectiveEvaluator, Penalty};
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![Node::customer(3.0, 4.0, 120.0, 0.0)],
///     vec![],
///     Vehicle::new(100.0, 50.0, 1.0),
///     1,
/// )
/// .unwrap();
///
/// let eval = ObjectiveEvaluator::new(&model);
/// let sol = Solution::new(vec![Route::from_visits(vec![0, 1, 0])]);
/// // distance 10 + 2 * 20 excess load
/// assert!((eval.cost(&sol, &Penalty::new(2.0, 1.0, 1.0)) - 50.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveEvaluator<'m> {
    model: &'m Model,
}

impl<'m> ObjectiveEvaluator<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self { model }
    }

    /// The model this evaluator scores against.
    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Distance plus weighted violations; zero for a route with no customer.
    pub fn route_cost(&self, route: &Route, penalty: &Penalty) -> f64 {
        if !route.has_customers(self.model) {
            return 0.0;
        }
        route.distance(self.model)
            + penalty.capacity * capacity_violation(route, self.model)
            + penalty.time * time_violation(route, self.model)
            + penalty.battery * battery_violation(route, self.model)
    }

    /// Sum of route costs, cached on the solution under `penalty`.
    pub fn cost(&self, solution: &Solution, penalty: &Penalty) -> f64 {
        if let Some(value) = solution.cached_objective(penalty) {
            return value;
        }
        let value = solution
            .routes()
            .iter()
            .map(|r| self.route_cost(r, penalty))
            .sum();
        solution.cache_objective(*penalty, value);
        value
    }

    /// Returns `true` if `a` is preferred over `b`.
    ///
    /// A feasible solution beats an infeasible one. Between two feasible
    /// solutions fewer non-empty routes wins, then the lower objective.
    /// Between two infeasible ones the lower objective wins. Anything beats
    /// an absent `b`.
    pub fn is_better(&self, a: &Solution, b: Option<&Solution>, penalty: &Penalty) -> bool {
        let Some(b) = b else {
            return true;
        };
        match (a.is_feasible(self.model), b.is_feasible(self.model)) {
            (true, false) => true,
            (false, true) => false,
            (true, true) => {
                let (ra, rb) = (a.num_nonempty_routes(), b.num_nonempty_routes());
                ra < rb || (ra == rb && self.cost(a, penalty) < self.cost(b, penalty))
            }
            (false, false) => self.cost(a, penalty) < self.cost(b, penalty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, TimeWindow, Vehicle};

    #[test]
    fn test_battery_deficit() {
        assert_eq!(battery_deficit(&[-5.0, 2.0, -3.0]), 8.0);
        assert_eq!(battery_deficit(&[5.0, 0.0, 3.0]), 0.0);
    }

    #[test]
    fn test_first_lateness_only_first() {
        let arrivals = [0.0, 5.0, 13.0, 20.0, 37.0];
        let dues = [100.0, 10.0, 10.0, 30.0, 30.0];
        assert_eq!(first_lateness(&arrivals, &dues), Some((2, 3.0)));
        assert_eq!(first_lateness(&arrivals, &[100.0; 5]), None);
    }

    #[test]
    fn test_capacity_excess_peak() {
        assert_eq!(capacity_excess(&[120.0, 80.0, 0.0], &[0.0, 40.0, 80.0], 100.0), 20.0);
        assert_eq!(capacity_excess(&[90.0, 0.0], &[0.0, 90.0], 100.0), 0.0);
    }

    #[test]
    fn test_capacity_excess_pickups() {
        // leave with 120, deliver 60, pick up 70 -> 130 after the pickup
        let loads = [120.0, 60.0, 130.0, 130.0];
        let demands = [0.0, 60.0, -70.0, 0.0];
        assert_eq!(capacity_excess(&loads, &demands, 100.0), 50.0);
    }

    fn model() -> Model {
        Model::new(
            Node::depot(0.0, 0.0),
            vec![
                Node::customer(1.0, 0.0, 10.0, 0.5),
                Node::customer(2.0, 0.0, 10.0, 0.0)
                    .with_time_window(TimeWindow::new(0.0, 2.0).expect("valid")),
                Node::customer(10.0, 0.0, 10.0, 0.0),
            ],
            vec![Node::recharger(1.0, 1.0), Node::recharger(9.0, 0.0)],
            Vehicle::new(100.0, 15.0, 1.0),
            3,
        )
        .expect("valid model")
    }

    #[test]
    fn test_route_cost_components() {
        let m = model();
        let eval = ObjectiveEvaluator::new(&m);
        // 0 -> 3 -> 0: 20 km on a 15 battery, deficit 5 at the depot
        let r = Route::from_visits(vec![0, 3, 0]);
        assert_eq!(battery_violation(&r, &m), 5.0);
        assert!((eval.route_cost(&r, &Penalty::new(1.0, 1.0, 2.0)) - 30.0).abs() < 1e-10);
        // 0 -> 1 -> 2 -> 0: customer 2 reached at 2.5, due 2.0
        let r = Route::from_visits(vec![0, 1, 2, 0]);
        assert!((time_violation(&r, &m) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_route_without_customers_is_free() {
        let m = model();
        let eval = ObjectiveEvaluator::new(&m);
        let r = Route::from_visits(vec![0, 4, 0]);
        assert_eq!(eval.route_cost(&r, &Penalty::uniform(10.0)), 0.0);
    }

    #[test]
    fn test_cost_is_cached() {
        let m = model();
        let eval = ObjectiveEvaluator::new(&m);
        let sol = Solution::new(vec![Route::from_visits(vec![0, 1, 0])]);
        let p = Penalty::uniform(1.0);
        assert_eq!(sol.cached_objective(&p), None);
        let c = eval.cost(&sol, &p);
        assert_eq!(sol.cached_objective(&p), Some(c));
    }

    #[test]
    fn test_feasible_beats_infeasible() {
        let m = model();
        let eval = ObjectiveEvaluator::new(&m);
        let p = Penalty::uniform(1.0);
        let feasible = Solution::new(vec![
            Route::from_visits(vec![0, 1, 0]),
            Route::from_visits(vec![0, 2, 0]),
            Route::from_visits(vec![0, 3, 5, 0]),
        ]);
        assert!(feasible.is_feasible(&m));
        let infeasible = Solution::new(vec![Route::from_visits(vec![0, 1, 2, 3, 0])]);
        assert!(!infeasible.is_feasible(&m));
        assert!(eval.cost(&infeasible, &p) < eval.cost(&feasible, &p));
        assert!(eval.is_better(&feasible, Some(&infeasible), &p));
        assert!(!eval.is_better(&infeasible, Some(&feasible), &p));
        assert!(eval.is_better(&infeasible, None, &p));
    }

    #[test]
    fn test_fewer_routes_wins_when_feasible() {
        let m = Model::new(
            Node::depot(0.0, 0.0),
            vec![
                Node::customer(1.0, 0.0, 10.0, 0.0),
                Node::customer(0.0, 1.0, 10.0, 0.0),
            ],
            vec![],
            Vehicle::new(100.0, 100.0, 1.0),
            2,
        )
        .expect("valid model");
        let eval = ObjectiveEvaluator::new(&m);
        let p = Penalty::uniform(1.0);
        let one = Solution::new(vec![Route::from_visits(vec![0, 1, 2, 0])]);
        let two = Solution::new(vec![
            Route::from_visits(vec![0, 1, 0]),
            Route::from_visits(vec![0, 2, 0]),
        ]);
        assert!(eval.is_better(&one, Some(&two), &p));
        assert!(!eval.is_better(&two, Some(&one), &p));
        assert!(!eval.is_better(&one, Some(&one.clone()), &p));
    }
}
