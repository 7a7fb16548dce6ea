//! Domain model types for electric vehicle routing.
//!
//! Provides the core abstractions: depot, customer and charging-station
//! nodes, the electric vehicle, routes as ordered sequences of node ids, and
//! the problem instance that owns the nodes.

mod model;
mod node;
mod route;
mod solution;
mod vehicle;

pub use model::{MapBounds, Model};
pub use node::{Node, NodeKind, TimeWindow};
pub use route::{Route, RouteProfile};
pub use solution::{Solution, Violation, ViolationType};
pub use vehicle::Vehicle;
