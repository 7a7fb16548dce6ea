//! Simulated-annealing acceptance for worsening candidates.
//!
//! VNS-TS keeps two schedules: one for the feasibility-seeking phase and
//! one for the distance-improving phase.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Schneider, Stenger & Goeke (2014), "The Electric Vehicle-Routing Problem
//!   with Time Windows and Recharging Stations"

mod schedule;

pub use schedule::AnnealingSchedule;
