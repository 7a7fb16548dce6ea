//! Wandering tabu search over arc-driven neighbourhoods.
//!
//! Used standalone as the refinement step of VNS-TS and as the
//! intensification step of DEMA.
//!
//! # Reference
//!
//! Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.

mod config;
mod list;
mod search;

pub use config::TabuConfig;
pub use list::TabuList;
pub use search::TabuSearch;
