//! Route state, constraint violations and the penalized objective.
//!
//! - [`compute_profile`]: cumulative load, arrival time and battery per visit
//! - [`ObjectiveEvaluator`]: penalized route/solution cost and the shared
//!   "better than" rule
//! - [`PenaltyController`]: adaptive penalty weights

mod objective;
mod penalty;
mod profile;

pub use objective::{
    battery_deficit, battery_violation, capacity_excess, capacity_violation, first_late_arrival,
    first_lateness, time_violation, Constraint, ObjectiveEvaluator, Penalty,
};
pub use penalty::PenaltyController;
pub use profile::compute_profile;
