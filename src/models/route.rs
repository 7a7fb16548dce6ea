//! Routes and their cumulative state.

use std::cell::OnceCell;
use std::fmt;
use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Model;
use crate::evaluation::{self, compute_profile};

/// Cumulative state of a route at every visit index.
///
/// Index `i` of each vector describes visit `i` of the route (including both
/// depot endpoints).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteProfile {
    /// Load carried after serving visit `i` (index 0 = leaving the depot).
    pub loads: Vec<f64>,
    /// Arrival time at visit `i` (index 0 = depot opening time).
    pub arrivals: Vec<f64>,
    /// Remaining battery on arrival at visit `i`.
    pub batteries: Vec<f64>,
    /// Total travelled distance.
    pub distance: f64,
}

/// An ordered sequence of node ids that starts and ends at the depot.
///
/// The cumulative [`RouteProfile`] is computed on first access and dropped
/// whenever the visit list is mutated through [`visits_mut`](Self::visits_mut),
/// [`insert`](Self::insert) or [`remove`](Self::remove). Cloning a route
/// keeps its profile.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Route, Vehicle};
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![Node::customer(3.0, 4.0, 10.0, 0.0)],
///     vec![],
///     Vehicle::new(100.0, 50.0, 1.0),
///     1,
/// )
/// .unwrap();
///
/// let mut route = Route::new(Model::DEPOT);
/// assert!(route.is_empty());
/// route.insert(1, 1);
/// assert_eq!(route.visits(), &[0, 1, 0]);
/// assert!((route.distance(&model) - 10.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    visits: Vec<usize>,
    #[serde(skip)]
    profile: OnceCell<RouteProfile>,
}

impl Route {
    /// Creates a route that leaves the depot and returns immediately.
    pub fn new(depot: usize) -> Self {
        Self::from_visits(vec![depot, depot])
    }

    /// Creates a route from a full visit list (depot endpoints included).
    pub fn from_visits(visits: Vec<usize>) -> Self {
        debug_assert!(visits.len() >= 2, "a route needs both depot endpoints");
        Self {
            visits,
            profile: OnceCell::new(),
        }
    }

    /// All visits, depot endpoints included.
    pub fn visits(&self) -> &[usize] {
        &self.visits
    }

    /// Mutable access to the visits; invalidates the cached profile.
    pub fn visits_mut(&mut self) -> &mut Vec<usize> {
        self.profile.take();
        &mut self.visits
    }

    /// Visits strictly between the two depot endpoints.
    pub fn inner(&self) -> &[usize] {
        &self.visits[1..self.visits.len() - 1]
    }

    /// Number of visits, depot endpoints included.
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    /// Returns `true` if the route only holds its two depot endpoints.
    pub fn is_empty(&self) -> bool {
        self.visits.len() <= 2
    }

    /// Inserts `node` so that it ends up at index `pos`.
    pub fn insert(&mut self, pos: usize, node: usize) {
        self.visits_mut().insert(pos, node);
    }

    /// Removes and returns the visit at index `pos`.
    pub fn remove(&mut self, pos: usize) -> usize {
        self.visits_mut().remove(pos)
    }

    /// Index of the first inner visit to `node`, if any.
    pub fn position_of(&self, node: usize) -> Option<usize> {
        self.inner().iter().position(|&v| v == node).map(|p| p + 1)
    }

    /// Number of customer visits.
    pub fn customer_count(&self, model: &Model) -> usize {
        self.inner()
            .iter()
            .filter(|&&v| model.node(v).is_customer())
            .count()
    }

    /// Returns `true` if at least one customer is served.
    pub fn has_customers(&self, model: &Model) -> bool {
        self.inner().iter().any(|&v| model.node(v).is_customer())
    }

    /// Indices of recharger visits.
    pub fn recharger_positions(&self, model: &Model) -> Vec<usize> {
        self.visits
            .iter()
            .enumerate()
            .filter(|&(_, &v)| model.node(v).is_recharger())
            .map(|(i, _)| i)
            .collect()
    }

    /// Cumulative load/time/battery state, computed on demand.
    pub fn profile(&self, model: &Model) -> &RouteProfile {
        self.profile
            .get_or_init(|| compute_profile(model, &self.visits))
    }

    /// Returns `true` if the profile has been computed and not invalidated.
    pub fn has_cached_profile(&self) -> bool {
        self.profile.get().is_some()
    }

    /// Total distance travelled.
    pub fn distance(&self, model: &Model) -> f64 {
        self.profile(model).distance
    }

    /// Mean length of the route's arcs.
    pub fn average_distance(&self, model: &Model) -> f64 {
        self.distance(model) / (self.visits.len() - 1) as f64
    }

    /// Drops the cached profile.
    pub fn clear_cache(&mut self) {
        self.profile.take();
    }

    pub fn is_capacity_feasible(&self, model: &Model) -> bool {
        evaluation::capacity_violation(self, model) <= 0.0
    }

    pub fn is_time_feasible(&self, model: &Model) -> bool {
        evaluation::time_violation(self, model) <= 0.0
    }

    pub fn is_battery_feasible(&self, model: &Model) -> bool {
        evaluation::battery_violation(self, model) <= 0.0
    }

    /// Returns `true` if capacity, time windows and battery all hold.
    pub fn is_feasible(&self, model: &Model) -> bool {
        self.is_capacity_feasible(model)
            && self.is_time_feasible(model)
            && self.is_battery_feasible(model)
    }

    /// Picks a random contiguous range of inner visits of length at most
    /// `max_len` (possibly empty).
    pub fn random_segment<R: Rng + ?Sized>(&self, rng: &mut R, max_len: usize) -> Range<usize> {
        let inner_len = self.visits.len() - 2;
        let seg_len = rng.random_range(0..=max_len.min(inner_len));
        let start = rng.random_range(1..=inner_len + 1 - seg_len);
        start..start + seg_len
    }

    /// Consecutive node pairs travelled by this route.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.visits.windows(2).map(|w| (w[0], w[1]))
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.visits == other.visits
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.visits.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join(" -> "))
    }
}
