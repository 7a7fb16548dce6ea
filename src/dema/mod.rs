//! Distance- and energy-aware memetic algorithm (DEMA).
//!
//! A population of feasible and infeasible solutions evolves by two
//! route-dissolving crossovers whose usage adapts to their recent success.
//! Survivor selection keeps a fixed share of infeasible solutions, ranked
//! by objective and arc-overlap diversity, and the population is
//! periodically refined by tabu search and charging-station repair.

mod config;
mod runner;
mod selection;

pub use config::DemaConfig;
pub use runner::{Dema, DemaResult, DemaState};
pub use selection::{binary_tournament, pareto_compare, pareto_fronts, pareto_order, ParetoCompare};
