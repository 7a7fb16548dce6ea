//! Resumable DEMA snapshots and textual solution reports.
//!
//! A snapshot is a JSON document holding the model, the incumbent and the
//! population. It carries a format version; loading rejects any version
//! other than [`SNAPSHOT_VERSION`] before decoding the rest, so a layout
//! change only needs a version bump.

use std::fmt;
use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dema::{Dema, DemaState};
use crate::error::{EvrpError, Result};
use crate::models::{Model, Solution, Violation, ViolationType};

/// Format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A frozen DEMA run.
///
/// # Examples
///
/// ```
/// use u_evrp::dema::DemaState;
/// use u_evrp::models::{Model, Node, Route, Solution, Vehicle};
/// use u_evrp::snapshot::{Snapshot, SNAPSHOT_VERSION};
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![Node::customer(1.0, 0.0, 1.0, 0.0)],
///     vec![],
///     Vehicle::new(10.0, 100.0, 1.0),
///     1,
/// )
/// .unwrap();
/// let sol = Solution::new(vec![Route::from_visits(vec![0, 1, 0])]);
/// let state = DemaState {
///     best: Some(sol.clone()),
///     best_cost: Some(2.0),
///     population: vec![sol],
/// };
///
/// let json = Snapshot::new(model, state.clone()).to_json().unwrap();
/// let back = Snapshot::from_json(&json).unwrap();
/// assert_eq!(back.version, SNAPSHOT_VERSION);
/// assert_eq!(back.state, state);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub model: Model,
    pub state: DemaState,
}

impl Snapshot {
    /// Wraps `state` at the current format version.
    pub fn new(model: Model, state: DemaState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            model,
            state,
        }
    }

    /// Freezes `dema`, which runs on `model`.
    pub fn capture<R: Rng>(model: &Model, dema: &Dema<'_, R>) -> Self {
        Self::new(model.clone(), dema.state())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a snapshot, checking its version first.
    ///
    /// # Errors
    ///
    /// [`EvrpError::UnsupportedSnapshot`] for another format version,
    /// [`EvrpError::Json`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let found = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX));
        if found != SNAPSHOT_VERSION {
            return Err(EvrpError::UnsupportedSnapshot {
                found,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Printable summary of a solution: routes, distance and feasibility.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Route, Solution, Vehicle};
/// use u_evrp::snapshot::SolutionReport;
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![Node::customer(3.0, 4.0, 1.0, 0.0)],
///     vec![],
///     Vehicle::new(10.0, 100.0, 1.0),
///     1,
/// )
/// .unwrap();
/// let sol = Solution::new(vec![Route::from_visits(vec![0, 1, 0])]);
/// let report = SolutionReport::new(&sol, &model);
/// assert!(report.feasible);
/// assert!(report.to_string().contains("0 -> 1 -> 0"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionReport {
    /// Node ids of each route, depot endpoints included.
    pub routes: Vec<Vec<usize>>,
    pub total_distance: f64,
    pub feasible: bool,
    pub violations: Vec<Violation>,
}

impl SolutionReport {
    pub fn new(solution: &Solution, model: &Model) -> Self {
        Self {
            routes: solution.routes().iter().map(|r| r.visits().to_vec()).collect(),
            total_distance: solution.total_distance(model),
            feasible: solution.is_feasible(model),
            violations: solution.violations(model),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, route) in self.routes.iter().enumerate() {
            let parts: Vec<String> = route.iter().map(|v| v.to_string()).collect();
            writeln!(f, "route {i}: {}", parts.join(" -> "))?;
        }
        writeln!(f, "total distance: {:.4}", self.total_distance)?;
        writeln!(f, "feasible: {}", self.feasible)?;
        for v in &self.violations {
            match &v.kind {
                ViolationType::CapacityExceeded { route_index, excess } => {
                    writeln!(f, "  route {route_index}: capacity exceeded by {excess:.4}")?
                }
                ViolationType::TimeWindowViolated {
                    route_index,
                    position,
                    node,
                    lateness,
                } => writeln!(
                    f,
                    "  route {route_index}: node {node} at {position} late by {lateness:.4}"
                )?,
                ViolationType::BatteryDepleted {
                    route_index,
                    position,
                    deficit,
                } => writeln!(
                    f,
                    "  route {route_index}: battery depleted from {position}, deficit {deficit:.4}"
                )?,
            }
        }
        Ok(())
    }
}
