//! Node and time window types.

use serde::{Deserialize, Serialize};

/// A time window constraint for service at a node.
///
/// The vehicle must arrive no later than `due` and may arrive as early as
/// `ready` (waiting is allowed if early).
///
/// # Examples
///
/// ```
/// use u_evrp::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0).unwrap();
/// assert!(tw.ready() <= tw.due());
/// assert!(tw.contains(150.0));
/// assert!(!tw.contains(250.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    ready: f64,
    due: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `ready > due` or either value is non-finite.
    pub fn new(ready: f64, due: f64) -> Option<Self> {
        if !ready.is_finite() || !due.is_finite() || ready > due {
            return None;
        }
        Some(Self { ready, due })
    }

    /// A window open from time zero that never closes in practice.
    pub fn unbounded() -> Self {
        Self {
            ready: 0.0,
            due: f64::MAX,
        }
    }

    /// Earliest allowable arrival time.
    pub fn ready(&self) -> f64 {
        self.ready
    }

    /// Latest allowable arrival time.
    pub fn due(&self) -> f64 {
        self.due
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.ready && time <= self.due
    }

    /// Returns the waiting time if arriving at the given time.
    ///
    /// Zero if the vehicle arrives within or after the window.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        if arrival < self.ready {
            self.ready - arrival
        } else {
            0.0
        }
    }

    /// How late an arrival at `arrival` is; zero when on time.
    pub fn lateness(&self, arrival: f64) -> f64 {
        (arrival - self.due).max(0.0)
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// The role a node plays in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Start and end of every route; vehicles leave it fully charged.
    Depot,
    /// A node with demand that must be visited exactly once.
    Customer,
    /// A charging station; may be visited any number of times, or never.
    Recharger,
}

/// A location in an EVRP instance.
///
/// Nodes are owned by a [`Model`](super::Model), which assigns their ids;
/// routes refer to them by id.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Node, NodeKind, TimeWindow};
///
/// let c = Node::customer(41.0, 49.0, 10.0, 10.0)
///     .with_time_window(TimeWindow::new(0.0, 200.0).unwrap());
/// assert_eq!(c.kind(), NodeKind::Customer);
/// assert_eq!(c.demand(), 10.0);
///
/// let s = Node::recharger(40.0, 50.0);
/// assert!(s.is_recharger());
/// assert_eq!(s.demand(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: usize,
    kind: NodeKind,
    x: f64,
    y: f64,
    demand: f64,
    service_time: f64,
    time_window: TimeWindow,
}

impl Node {
    fn with_kind(kind: NodeKind, x: f64, y: f64) -> Self {
        Self {
            id: 0,
            kind,
            x,
            y,
            demand: 0.0,
            service_time: 0.0,
            time_window: TimeWindow::unbounded(),
        }
    }

    /// Creates a depot at the given coordinates.
    pub fn depot(x: f64, y: f64) -> Self {
        Self::with_kind(NodeKind::Depot, x, y)
    }

    /// Creates a customer. A negative demand marks a pickup.
    pub fn customer(x: f64, y: f64, demand: f64, service_time: f64) -> Self {
        Self {
            demand,
            service_time,
            ..Self::with_kind(NodeKind::Customer, x, y)
        }
    }

    /// Creates a charging station.
    pub fn recharger(x: f64, y: f64) -> Self {
        Self::with_kind(NodeKind::Recharger, x, y)
    }

    /// Sets the time window of this node.
    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = tw;
        self
    }

    /// Sets the service duration of this node.
    pub fn with_service_time(mut self, service_time: f64) -> Self {
        self.service_time = service_time;
        self
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    /// Node id inside its model.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Node kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_depot(&self) -> bool {
        self.kind == NodeKind::Depot
    }

    pub fn is_customer(&self) -> bool {
        self.kind == NodeKind::Customer
    }

    pub fn is_recharger(&self) -> bool {
        self.kind == NodeKind::Recharger
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Demand at this node (zero unless a customer).
    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Service duration at this node.
    pub fn service_time(&self) -> f64 {
        self.service_time
    }

    /// Time window of this node.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Shorthand for `time_window().ready()`.
    pub fn ready_time(&self) -> f64 {
        self.time_window.ready()
    }

    /// Shorthand for `time_window().due()`.
    pub fn due_time(&self) -> f64 {
        self.time_window.due()
    }

    /// Euclidean distance to another node.
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns `true` if both nodes sit on the same coordinates.
    pub fn same_location(&self, other: &Node) -> bool {
        self.x == other.x && self.y == other.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(20.0, 10.0).is_none());
        assert!(TimeWindow::new(f64::NAN, 10.0).is_none());
        assert!(TimeWindow::new(10.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_time_window_waiting() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert!((tw.waiting_time(5.0) - 5.0).abs() < 1e-10);
        assert!((tw.waiting_time(15.0)).abs() < 1e-10);
    }

    #[test]
    fn test_time_window_lateness() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert_eq!(tw.lateness(20.0), 0.0);
        assert!((tw.lateness(23.5) - 3.5).abs() < 1e-10);
    }

    #[test]
    fn test_node_kinds() {
        assert!(Node::depot(0.0, 0.0).is_depot());
        assert!(Node::customer(1.0, 1.0, 5.0, 1.0).is_customer());
        assert!(Node::recharger(2.0, 2.0).is_recharger());
    }

    #[test]
    fn test_pickup_customer() {
        let c = Node::customer(1.0, 1.0, -7.0, 0.0);
        assert_eq!(c.demand(), -7.0);
    }

    #[test]
    fn test_node_distance() {
        let a = Node::depot(0.0, 0.0);
        let b = Node::customer(3.0, 4.0, 0.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
        assert!(!a.same_location(&b));
        assert!(a.same_location(&Node::recharger(0.0, 0.0)));
    }
}
