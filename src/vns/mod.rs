//! Variable neighbourhood search with tabu refinement (VNS-TS).
//!
//! Shakes the current solution with a cyclic segment exchange, refines it
//! with tabu search and accepts the result by comparison or by simulated
//! annealing. The search first looks for any feasible solution, opening
//! extra routes when it stalls, and then minimises distance.
//!
//! # Reference
//!
//! Schneider, M., Stenger, A. & Goeke, D. (2014). "The Electric
//! Vehicle-Routing Problem with Time Windows and Recharging Stations",
//! *Transportation Science* 48(4), 500-520.

mod config;
mod runner;

pub use config::VnsConfig;
pub use runner::{Phase, VnsResult, VnsTs};
