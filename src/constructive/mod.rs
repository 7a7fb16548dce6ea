//! Constructive heuristics for building initial EVRP solutions.
//!
//! - [`random_sweep`]: Polar-angle sweep around a random pivot with
//!   cheapest insertion (Gillett & Miller, 1974), O(n² log n)

mod sweep;

pub use sweep::{angle_between, random_sweep, Admission};
