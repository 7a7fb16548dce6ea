//! Error type shared by the solvers.

use thiserror::Error;

/// Errors raised while building a model or running a search.
///
/// Constraint violations of a route or solution are not errors: they are
/// tracked through penalties. Only defects and bad inputs end up here.
#[derive(Debug, Error)]
pub enum EvrpError {
    /// The problem instance is malformed.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// A solver configuration is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An operator produced a solution that no longer serves every
    /// customer exactly once.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The snapshot was written by an incompatible format version.
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshot {
        /// Version stored in the snapshot.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },

    /// The snapshot's population does not belong to the model it is resumed on.
    #[error("snapshot does not match the model: {0}")]
    SnapshotMismatch(String),

    /// Weighted sampling was handed weights it cannot draw from.
    #[error("weighted sampling failed")]
    Sampling(#[from] rand::seq::WeightError),

    /// Reading or writing a snapshot failed.
    #[error("snapshot I/O failed")]
    Io(#[from] std::io::Error),

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot encoding failed")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EvrpError>;
