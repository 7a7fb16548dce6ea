//! # u-evrp
//!
//! Electric vehicle routing with time windows: partition customers into
//! depot-to-depot routes under capacity, time-window and battery limits,
//! detouring through charging stations where needed.
//!
//! Two metaheuristics share one neighbourhood library and one penalized
//! objective:
//!
//! - [`vns::VnsTs`]: variable neighbourhood search with tabu refinement,
//!   first seeking feasibility, then minimising distance
//! - [`dema::Dema`]: memetic algorithm mixing feasible and infeasible
//!   solutions, with adaptive crossovers and periodic intensification
//!
//! ## Modules
//!
//! - [`models`]: Nodes, vehicle, model, routes and solutions
//! - [`distance`]: Euclidean distance matrix
//! - [`evaluation`]: Route profiles, violations, penalized objective, adaptive penalties
//! - [`neighborhood`]: Candidate arcs, shaking, tabu moves, crossovers
//! - [`repair`]: Charging-station insertion and time-window repair
//! - [`constructive`]: Randomized sweep construction
//! - [`sa`]: Annealing acceptance schedule
//! - [`tabu`]: Tabu search engine
//! - [`vns`]: VNS-TS solver
//! - [`dema`]: DEMA solver, Pareto ranking and tournament selection
//! - [`snapshot`]: Resumable snapshots and solution reports
//! - [`random`]: Seeded RNG and weighted selection helpers
//! - [`error`]: Error type

pub mod constructive;
pub mod dema;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod neighborhood;
pub mod random;
pub mod repair;
pub mod sa;
pub mod snapshot;
pub mod tabu;
pub mod vns;

pub use error::{EvrpError, Result};
