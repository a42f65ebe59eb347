// ABOUTME: Rollout phases, events, and the pure transition function.
// ABOUTME: Every lifecycle change goes through transition; the supervisor only performs actions.

use super::error::RolloutError;
use super::readiness::Readiness;
use std::fmt;
use std::time::Duration;

/// Lifecycle phase of one image update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Updating,
    Watching,
    Ready,
    Failed,
    RollingBack,
    RolledBack,
    RollbackFailed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Updating => "updating",
            Phase::Watching => "watching",
            Phase::Ready => "ready",
            Phase::Failed => "failed",
            Phase::RollingBack => "rolling back",
            Phase::RolledBack => "rolled back",
            Phase::RollbackFailed => "rollback failed",
        };
        f.write_str(name)
    }
}

/// Something that happened to the rollout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The new image was written to the pod template.
    ImageUpdated { watch: bool },
    /// One readiness poll completed.
    Observed(Readiness),
    /// The watch deadline passed before the workload became ready.
    TimedOut(Duration),
    /// The workload status could not be read.
    ProbeFailed(String),
    RollbackApproved,
    RollbackDeclined,
    /// There is no previous image to restore.
    NoRollbackTarget,
    Reverted,
    RevertFailed(String),
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::ImageUpdated { .. } => "image-updated",
            Event::Observed(Readiness::Ready) => "observed-ready",
            Event::Observed(Readiness::Progressing) => "observed-progressing",
            Event::Observed(Readiness::Unhealthy(_)) => "observed-unhealthy",
            Event::TimedOut(_) => "timed-out",
            Event::ProbeFailed(_) => "probe-failed",
            Event::RollbackApproved => "rollback-approved",
            Event::RollbackDeclined => "rollback-declined",
            Event::NoRollbackTarget => "no-rollback-target",
            Event::Reverted => "reverted",
            Event::RevertFailed(_) => "revert-failed",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the driver must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Wait for the next poll tick or the deadline.
    Poll,
    /// Decide whether to restore the previous image.
    ConfirmRollback,
    /// Write the previous image back.
    Revert,
    /// Stop; the phase is terminal.
    Finish,
}

/// Advance `phase` by `event`.
///
/// Pure: no I/O, no clock. Pairs not listed are rejected.
pub fn transition(phase: Phase, event: &Event) -> Result<(Phase, Action), RolloutError> {
    use Action::*;

    let next = match (phase, event) {
        (Phase::Updating, Event::ImageUpdated { watch: true }) => (Phase::Watching, Poll),
        (Phase::Updating, Event::ImageUpdated { watch: false }) => (Phase::Ready, Finish),

        (Phase::Watching, Event::Observed(Readiness::Progressing)) => (Phase::Watching, Poll),
        (Phase::Watching, Event::Observed(Readiness::Ready)) => (Phase::Ready, Finish),
        (Phase::Watching, Event::Observed(Readiness::Unhealthy(_)))
        | (Phase::Watching, Event::TimedOut(_))
        | (Phase::Watching, Event::ProbeFailed(_)) => (Phase::Failed, ConfirmRollback),

        (Phase::Failed, Event::RollbackApproved) => (Phase::RollingBack, Revert),
        (Phase::Failed, Event::RollbackDeclined) | (Phase::Failed, Event::NoRollbackTarget) => {
            (Phase::Failed, Finish)
        }

        (Phase::RollingBack, Event::Reverted) => (Phase::RolledBack, Finish),
        (Phase::RollingBack, Event::RevertFailed(_)) => (Phase::RollbackFailed, Finish),

        (phase, event) => {
            return Err(RolloutError::InvalidTransition {
                phase,
                event: event.to_string(),
            });
        }
    };

    Ok(next)
}
