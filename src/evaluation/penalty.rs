//! Adaptive penalty weights driven by recent feasibility outcomes.

use std::collections::VecDeque;

use super::{Constraint, Penalty};
use crate::models::{Model, Solution};

/// Tunes the capacity, time and battery penalty weights from a sliding
/// window of feasibility samples.
///
/// After each sample, a full window of `false` multiplies the weight by
/// `delta` (capped at that constraint's `max`); a full window of `true`
/// divides it by `delta` (floored at that constraint's `min`).
///
/// # Examples
///
/// ```
/// use u_evrp::evaluation::{Constraint, Penalty, PenaltyController};
///
/// let mut ctl = PenaltyController::new(
///     Penalty::uniform(10.0),
///     Penalty::uniform(0.5),
///     Penalty::uniform(5000.0),
///     1.2,
///     2,
/// );
/// ctl.record(Constraint::Time, false);
/// ctl.record(Constraint::Time, false);
/// assert!((ctl.weights().time - 12.0).abs() < 1e-10);
/// assert!((ctl.weights().battery - 10.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct PenaltyController {
    weights: Penalty,
    min: Penalty,
    max: Penalty,
    delta: f64,
    window_len: usize,
    windows: [VecDeque<bool>; 3],
}

impl PenaltyController {
    /// Creates a controller starting from `initial` weights, each kept
    /// within its own `[min, max]` bounds.
    pub fn new(initial: Penalty, min: Penalty, max: Penalty, delta: f64, window_len: usize) -> Self {
        let window_len = window_len.max(1);
        Self {
            weights: initial,
            min,
            max,
            delta,
            window_len,
            windows: std::array::from_fn(|_| VecDeque::with_capacity(window_len)),
        }
    }

    /// Current weights.
    pub fn weights(&self) -> &Penalty {
        &self.weights
    }

    /// Appends one feasibility sample for `constraint` and adjusts its weight.
    pub fn record(&mut self, constraint: Constraint, satisfied: bool) {
        let idx = constraint as usize;
        let window = &mut self.windows[idx];
        if window.len() == self.window_len {
            window.pop_front();
        }
        window.push_back(satisfied);
        if window.len() < self.window_len {
            return;
        }

        let weight = self.weights.get(constraint);
        if window.iter().all(|&ok| !ok) {
            self.weights.set(constraint, (weight * self.delta).min(self.max.get(constraint)));
        } else if window.iter().all(|&ok| ok) {
            self.weights.set(constraint, (weight / self.delta).max(self.min.get(constraint)));
        }
    }

    /// Records the feasibility of `solution` for all three constraints.
    pub fn observe(&mut self, solution: &Solution, model: &Model) {
        self.record(Constraint::Capacity, solution.is_capacity_feasible(model));
        self.record(Constraint::Time, solution.is_time_feasible(model));
        self.record(Constraint::Battery, solution.is_battery_feasible(model));
    }
}
