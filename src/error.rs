//! Custom error types for continuum.

use thiserror::Error;

use crate::engine::Domain;

/// Errors raised while turning a requested id into an execution plan.
///
/// Both variants surface before any action runs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unknown {domain} target: {id}")]
    UnknownTarget { domain: Domain, id: String },

    #[error("Cycle detected in {domain} targets: {id}")]
    CycleDetected { domain: Domain, id: String },
}
