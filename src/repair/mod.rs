//! Repair operators for infeasible solutions.
//!
//! - [`repair_charging`]: insert unused charging stations into routes that
//!   run out of battery
//! - [`fix_time_windows`]: move a customer out of a route that arrives late

mod charging;
mod time_window;

pub use charging::repair_charging;
pub use time_window::fix_time_windows;
