// ABOUTME: Rollout error types with SNAFU pattern.
// ABOUTME: Separates failures before the update from state machine misuse.

use snafu::Snafu;

use super::phase::Phase;
use crate::workload::WorkloadError;

/// Errors that stop a rollout before it reaches a terminal phase.
///
/// A failed watch or revert is not an error; it is reported through the
/// terminal [`super::RolloutState`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RolloutError {
    #[snafu(display("failed to read current image of {container} in {deployment}: {source}"))]
    PreviousImage {
        deployment: String,
        container: String,
        source: WorkloadError,
    },

    #[snafu(display("failed to update image: {source}"))]
    Patch { source: WorkloadError },

    #[snafu(display("invalid rollout transition: {event} while {phase}"))]
    InvalidTransition { phase: Phase, event: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutErrorKind {
    /// The deployment or container does not exist.
    NotFound,
    /// The cluster rejected or could not serve the request.
    Cluster,
    /// Internal state machine misuse.
    InvalidTransition,
}

impl RolloutError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> RolloutErrorKind {
        match self {
            RolloutError::PreviousImage { source, .. } | RolloutError::Patch { source } => {
                match source {
                    WorkloadError::NotFound(_) | WorkloadError::ContainerNotFound { .. } => {
                        RolloutErrorKind::NotFound
                    }
                    _ => RolloutErrorKind::Cluster,
                }
            }
            RolloutError::InvalidTransition { .. } => RolloutErrorKind::InvalidTransition,
        }
    }
}
