//! Solution and violation types.

use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Model, Route};
use crate::evaluation::{self, Penalty};

/// A type of constraint violation in a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Load exceeds the vehicle capacity.
    CapacityExceeded {
        /// Route index in the solution.
        route_index: usize,
        /// Total excess load (departure plus pickup points).
        excess: f64,
    },
    /// First arrival after a node's time window closes.
    TimeWindowViolated {
        /// Route index in the solution.
        route_index: usize,
        /// Visit index of the first late arrival.
        position: usize,
        /// Node that was reached late.
        node: usize,
        /// How late the vehicle arrived.
        lateness: f64,
    },
    /// The battery runs below zero somewhere on the route.
    BatteryDepleted {
        /// Route index in the solution.
        route_index: usize,
        /// Visit index of the first negative battery reading.
        position: usize,
        /// Sum of all negative battery readings, as a positive number.
        deficit: f64,
    },
}

/// A constraint violation in a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// A set of routes covering the customers of a [`Model`].
///
/// The penalized objective is cached together with the penalty weights it was
/// computed under; any mutable access to the routes drops it.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Route, Solution, Vehicle};
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![Node::customer(1.0, 0.0, 5.0, 0.0), Node::customer(0.0, 1.0, 5.0, 0.0)],
///     vec![],
///     Vehicle::new(100.0, 100.0, 1.0),
///     2,
/// )
/// .unwrap();
///
/// let sol = Solution::new(vec![
///     Route::from_visits(vec![0, 1, 0]),
///     Route::from_visits(vec![0, 2, 0]),
/// ]);
/// assert_eq!(sol.num_routes(), 2);
/// assert!(sol.serves_all_customers(&model));
/// assert!(sol.is_feasible(&model));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<Route>,
    #[serde(skip)]
    objective: Cell<Option<(Penalty, f64)>>,
}

impl Solution {
    /// Creates a solution from the given routes.
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes,
            objective: Cell::new(None),
        }
    }

    /// Returns the routes in this solution.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Mutable access to the routes; invalidates the cached objective.
    pub fn routes_mut(&mut self) -> &mut Vec<Route> {
        self.objective.set(None);
        &mut self.routes
    }

    /// Returns the number of routes, empty ones included.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Returns the number of routes that visit at least one node.
    pub fn num_nonempty_routes(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// Appends a depot-to-depot route, giving the search room for one more
    /// vehicle.
    pub fn add_empty_route(&mut self) {
        self.routes_mut().push(Route::new(Model::DEPOT));
    }

    /// Drops every route that only holds its depot endpoints.
    pub fn remove_empty_routes(&mut self) {
        if self.routes.iter().any(Route::is_empty) {
            self.routes_mut().retain(|r| !r.is_empty());
        }
    }

    /// Objective cached under exactly these penalty weights, if any.
    pub fn cached_objective(&self, penalty: &Penalty) -> Option<f64> {
        match self.objective.get() {
            Some((p, value)) if p == *penalty => Some(value),
            _ => None,
        }
    }

    /// Stores the objective computed under `penalty`.
    pub fn cache_objective(&self, penalty: Penalty, value: f64) {
        self.objective.set(Some((penalty, value)));
    }

    /// Drops the cached objective and every route profile.
    pub fn clear_cache(&mut self) {
        for route in self.routes_mut() {
            route.clear_cache();
        }
    }

    /// Total distance across all routes.
    pub fn total_distance(&self, model: &Model) -> f64 {
        self.routes.iter().map(|r| r.distance(model)).sum()
    }

    /// Returns `true` if every customer of `model` is visited exactly once
    /// and no route visits an unknown node or breaks the depot endpoints.
    pub fn serves_all_customers(&self, model: &Model) -> bool {
        let mut seen = vec![false; model.nodes().len()];
        let mut served = 0;
        for route in &self.routes {
            let visits = route.visits();
            if visits.len() < 2
                || visits[0] != Model::DEPOT
                || visits[visits.len() - 1] != Model::DEPOT
            {
                return false;
            }
            for &v in route.inner() {
                if v >= seen.len() {
                    return false;
                }
                let node = model.node(v);
                if node.is_depot() {
                    return false;
                }
                if node.is_customer() {
                    if seen[v] {
                        return false;
                    }
                    seen[v] = true;
                    served += 1;
                }
            }
        }
        served == model.num_customers()
    }

    pub fn is_capacity_feasible(&self, model: &Model) -> bool {
        self.routes.iter().all(|r| r.is_capacity_feasible(model))
    }

    pub fn is_time_feasible(&self, model: &Model) -> bool {
        self.routes.iter().all(|r| r.is_time_feasible(model))
    }

    pub fn is_battery_feasible(&self, model: &Model) -> bool {
        self.routes.iter().all(|r| r.is_battery_feasible(model))
    }

    /// Returns `true` if every route satisfies all three constraints.
    pub fn is_feasible(&self, model: &Model) -> bool {
        self.routes.iter().all(|r| r.is_feasible(model))
    }

    /// Lists every violated constraint, route by route.
    pub fn violations(&self, model: &Model) -> Vec<Violation> {
        let mut out = Vec::new();
        for (route_index, route) in self.routes.iter().enumerate() {
            let excess = evaluation::capacity_violation(route, model);
            if excess > 0.0 {
                out.push(Violation::new(ViolationType::CapacityExceeded {
                    route_index,
                    excess,
                }));
            }
            let profile = route.profile(model);
            if let Some((position, lateness)) = evaluation::first_late_arrival(route, model) {
                out.push(Violation::new(ViolationType::TimeWindowViolated {
                    route_index,
                    position,
                    node: route.visits()[position],
                    lateness,
                }));
            }
            if let Some(position) = profile.batteries.iter().position(|&b| b < 0.0) {
                out.push(Violation::new(ViolationType::BatteryDepleted {
                    route_index,
                    position,
                    deficit: evaluation::battery_deficit(&profile.batteries),
                }));
            }
        }
        out
    }

    /// Rechargers visited anywhere in the solution.
    pub fn used_stations(&self, model: &Model) -> Vec<usize> {
        self.routes
            .iter()
            .flat_map(|r| r.inner().iter().copied())
            .filter(|&v| model.node(v).is_recharger())
            .collect()
    }

    /// Every arc travelled by the solution, route by route.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.routes.iter().flat_map(|r| r.arcs())
    }
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.routes == other.routes
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, route) in self.routes.iter().enumerate() {
            writeln!(f, "route {i}: {route}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, TimeWindow, Vehicle};

    fn model() -> Model {
        Model::new(
            Node::depot(0.0, 0.0),
            vec![
                Node::customer(1.0, 0.0, 60.0, 0.0),
                Node::customer(2.0, 0.0, 60.0, 0.0)
                    .with_time_window(TimeWindow::new(0.0, 1.0).expect("valid")),
            ],
            vec![Node::recharger(1.0, 1.0)],
            Vehicle::new(100.0, 100.0, 1.0),
            2,
        )
        .expect("valid model")
    }

    #[test]
    fn test_serves_all_customers() {
        let m = model();
        let ok = Solution::new(vec![Route::from_visits(vec![0, 1, 3, 2, 0])]);
        assert!(ok.serves_all_customers(&m));

        let missing = Solution::new(vec![Route::from_visits(vec![0, 1, 0])]);
        assert!(!missing.serves_all_customers(&m));

        let twice = Solution::new(vec![
            Route::from_visits(vec![0, 1, 2, 0]),
            Route::from_visits(vec![0, 1, 0]),
        ]);
        assert!(!twice.serves_all_customers(&m));

        let depot_inside = Solution::new(vec![Route::from_visits(vec![0, 1, 0, 2, 0])]);
        assert!(!depot_inside.serves_all_customers(&m));
    }

    #[test]
    fn test_station_may_repeat() {
        let m = model();
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 3, 1, 0]),
            Route::from_visits(vec![0, 3, 2, 0]),
        ]);
        assert!(sol.serves_all_customers(&m));
        assert_eq!(sol.used_stations(&m), vec![3, 3]);
    }

    #[test]
    fn test_violations_listed() {
        let m = model();
        // 120 load on one vehicle of capacity 100; customer 2 due at 1 but reached at 2
        let sol = Solution::new(vec![Route::from_visits(vec![0, 1, 2, 0])]);
        let v = sol.violations(&m);
        assert_eq!(v.len(), 2);
        assert!(matches!(
            v[0].kind,
            ViolationType::CapacityExceeded { route_index: 0, .. }
        ));
        assert!(matches!(
            v[1].kind,
            ViolationType::TimeWindowViolated {
                position: 2,
                node: 2,
                ..
            }
        ));
        assert!(!sol.is_feasible(&m));
        assert!(sol.is_battery_feasible(&m));
    }

    #[test]
    fn test_empty_routes() {
        let mut sol = Solution::new(vec![Route::from_visits(vec![0, 1, 2, 0])]);
        sol.add_empty_route();
        assert_eq!(sol.num_routes(), 2);
        assert_eq!(sol.num_nonempty_routes(), 1);
        sol.remove_empty_routes();
        assert_eq!(sol.num_routes(), 1);
    }

    #[test]
    fn test_objective_cache_keyed_by_penalty() {
        let mut sol = Solution::new(vec![Route::from_visits(vec![0, 1, 2, 0])]);
        let p = Penalty::new(1.0, 2.0, 3.0);
        sol.cache_objective(p, 42.0);
        assert_eq!(sol.cached_objective(&p), Some(42.0));
        assert_eq!(sol.cached_objective(&Penalty::new(1.0, 2.0, 4.0)), None);
        sol.routes_mut();
        assert_eq!(sol.cached_objective(&p), None);
    }

    #[test]
    fn test_display() {
        let sol = Solution::new(vec![Route::from_visits(vec![0, 1, 0])]);
        assert_eq!(sol.to_string(), "route 0: 0 -> 1 -> 0\n");
    }
}
