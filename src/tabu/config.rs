//! Tabu search configuration.

use serde::{Deserialize, Serialize};

use crate::error::{EvrpError, Result};

/// Configuration parameters for [`TabuSearch`](super::TabuSearch).
///
/// # Examples
///
/// ```
/// use u_evrp::tabu::TabuConfig;
///
/// let config = TabuConfig::default()
///     .with_iterations(50)
///     .with_tenure(5, 10);
/// assert_eq!(config.iterations, 50);
/// assert!(config.validate().is_ok());
/// assert!(TabuConfig::default().with_tenure(10, 5).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabuConfig {
    /// Iterations per run.
    pub iterations: usize,
    /// Shortest tenure drawn for an applied move.
    pub tenure_min: usize,
    /// Longest tenure drawn for an applied move.
    pub tenure_max: usize,
    /// Candidate arcs sampled per iteration.
    pub candidate_arcs: usize,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            tenure_min: 15,
            tenure_max: 30,
            candidate_arcs: 100,
        }
    }
}

impl TabuConfig {
    /// Sets the number of iterations per run.
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    /// Sets the tenure range, both ends inclusive.
    pub fn with_tenure(mut self, min: usize, max: usize) -> Self {
        self.tenure_min = min;
        self.tenure_max = max;
        self
    }

    /// Sets how many candidate arcs are sampled per iteration.
    pub fn with_candidate_arcs(mut self, n: usize) -> Self {
        self.candidate_arcs = n;
        self
    }

    /// Checks the tenure range and the arc sample size.
    pub fn validate(&self) -> Result<()> {
        if self.tenure_min == 0 || self.tenure_min > self.tenure_max {
            return Err(EvrpError::InvalidConfig(format!(
                "tabu tenure range [{}, {}] is empty or starts at zero",
                self.tenure_min, self.tenure_max
            )));
        }
        if self.candidate_arcs == 0 {
            return Err(EvrpError::InvalidConfig(
                "tabu search needs at least one candidate arc per iteration".into(),
            ));
        }
        Ok(())
    }
}
