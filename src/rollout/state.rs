// ABOUTME: Per-rollout record: target, images, phase, and the recorded failure.
// ABOUTME: Events are applied through the transition function, never by assigning the phase.

use super::error::RolloutError;
use super::phase::{Action, Event, Phase, transition};
use super::readiness::{FailureCause, Readiness};
use crate::types::{ContainerName, DeploymentName};

/// Why no rollback happened after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackSkipped {
    Declined,
    NoPreviousImage,
}

/// State of one image update, owned by its supervisor.
#[derive(Debug, Clone)]
pub struct RolloutState {
    pub deployment: DeploymentName,
    pub container: ContainerName,
    /// Image configured before the update; empty if there was none.
    pub previous_image: String,
    pub requested_image: String,
    phase: Phase,
    cause: Option<FailureCause>,
    skipped: Option<RollbackSkipped>,
    rollback_error: Option<String>,
}

impl RolloutState {
    pub fn new(
        deployment: DeploymentName,
        container: ContainerName,
        previous_image: impl Into<String>,
        requested_image: impl Into<String>,
    ) -> Self {
        Self {
            deployment,
            container,
            previous_image: previous_image.into(),
            requested_image: requested_image.into(),
            phase: Phase::Updating,
            cause: None,
            skipped: None,
            rollback_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Why the watch failed, once it has.
    pub fn cause(&self) -> Option<&FailureCause> {
        self.cause.as_ref()
    }

    pub fn rollback_skipped(&self) -> Option<RollbackSkipped> {
        self.skipped
    }

    pub fn rollback_error(&self) -> Option<&str> {
        self.rollback_error.as_deref()
    }

    /// Whether a rollback target exists.
    pub fn has_previous_image(&self) -> bool {
        !self.previous_image.is_empty()
    }

    /// Apply `event`, recording its payload, and return the next action.
    pub fn apply(&mut self, event: Event) -> Result<Action, RolloutError> {
        let (phase, action) = transition(self.phase, &event)?;
        tracing::debug!(from = %self.phase, to = %phase, %event, "rollout transition");

        match event {
            Event::Observed(Readiness::Unhealthy(cause)) => self.cause = Some(cause),
            Event::TimedOut(after) => self.cause = Some(FailureCause::Timeout(after)),
            Event::ProbeFailed(reason) => self.cause = Some(FailureCause::Probe(reason)),
            Event::RollbackDeclined => self.skipped = Some(RollbackSkipped::Declined),
            Event::NoRollbackTarget => self.skipped = Some(RollbackSkipped::NoPreviousImage),
            Event::RevertFailed(reason) => self.rollback_error = Some(reason),
            _ => {}
        }

        self.phase = phase;
        Ok(action)
    }

    /// One-line description of the terminal outcome.
    pub fn summary(&self) -> String {
        let target = format!("{}/{}", self.deployment, self.container);
        let cause = self
            .cause
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown failure".to_string());

        match self.phase {
            Phase::Ready => format!("{target} updated to {}", self.requested_image),
            Phase::RolledBack => format!(
                "{target} rolled back to {} ({cause})",
                self.previous_image
            ),
            Phase::RollbackFailed => format!(
                "{target} failed ({cause}) and rollback to {} failed: {}",
                self.previous_image,
                self.rollback_error.as_deref().unwrap_or("unknown error")
            ),
            Phase::Failed => match self.skipped {
                Some(RollbackSkipped::Declined) => {
                    format!("{target} failed ({cause}); rollback cancelled")
                }
                Some(RollbackSkipped::NoPreviousImage) => {
                    format!("{target} failed ({cause}); no previous image to roll back to")
                }
                None => format!("{target} failed ({cause})"),
            },
            phase => format!("{target} is {phase}"),
        }
    }
}
