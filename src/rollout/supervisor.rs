// ABOUTME: Drives one image update: patch, watch until ready or deadline, roll back on failure.
// ABOUTME: Polling and the deadline race in a single select loop; decisions go through transition.

use super::error::{PatchSnafu, PreviousImageSnafu, RolloutError};
use super::phase::{Action, Event};
use super::readiness::{Readiness, assess, is_ready};
use super::state::RolloutState;
use crate::diagnostics::{Diagnostics, Warning};
use crate::prompt::Confirm;
use crate::types::{ContainerName, DeploymentName};
use crate::workload::WorkloadRuntime;
use snafu::ResultExt;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

pub const DEFAULT_WATCH_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

// tokio intervals cannot have a zero period.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Deadline and poll period of the watch phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WATCH_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// The image change to perform.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub deployment: DeploymentName,
    pub container: ContainerName,
    pub image: String,
    /// Watch the rollout after patching.
    pub watch: bool,
}

/// Supervises a single rollout against a workload runtime.
pub struct Supervisor<'a, W: ?Sized> {
    runtime: &'a W,
    options: WatchOptions,
    confirm: Option<&'a dyn Confirm>,
}

impl<'a, W: WorkloadRuntime + ?Sized> Supervisor<'a, W> {
    /// Rollbacks run without asking unless a confirmation is attached.
    pub fn new(runtime: &'a W, options: WatchOptions) -> Self {
        Self {
            runtime,
            options,
            confirm: None,
        }
    }

    /// Ask `confirm` before rolling back.
    pub fn with_confirmation(mut self, confirm: &'a dyn Confirm) -> Self {
        self.confirm = Some(confirm);
        self
    }

    /// Apply `request` and return the terminal state.
    ///
    /// Errors only when the update itself cannot be written; a failed watch
    /// or revert ends in a terminal phase instead.
    pub async fn run(
        &self,
        request: &UpdateRequest,
        diagnostics: &mut Diagnostics,
    ) -> Result<RolloutState, RolloutError> {
        // Read immediately before the patch so the rollback target is current.
        let previous = self
            .runtime
            .current_image(&request.deployment, &request.container)
            .await
            .context(PreviousImageSnafu {
                deployment: request.deployment.to_string(),
                container: request.container.to_string(),
            })?;

        let mut state = RolloutState::new(
            request.deployment.clone(),
            request.container.clone(),
            previous,
            request.image.clone(),
        );

        self.runtime
            .patch_container_image(&request.deployment, &request.container, &request.image)
            .await
            .context(PatchSnafu)?;
        tracing::info!(
            deployment = %request.deployment,
            container = %request.container,
            from = %state.previous_image,
            to = %request.image,
            "image updated"
        );

        let mut action = state.apply(Event::ImageUpdated {
            watch: request.watch,
        })?;

        let period = self.options.interval.max(MIN_POLL_INTERVAL);
        let deadline = tokio::time::sleep(self.options.timeout);
        tokio::pin!(deadline);
        let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = match action {
                Action::Finish => break,
                Action::Poll => tokio::select! {
                    biased;
                    _ = &mut deadline => Event::TimedOut(self.options.timeout),
                    _ = ticks.tick() => self.probe(&request.deployment, diagnostics).await,
                },
                Action::ConfirmRollback => self.decide_rollback(&state).await,
                Action::Revert => self.revert(&state).await,
            };
            action = state.apply(event)?;
        }

        Ok(state)
    }

    async fn probe(&self, deployment: &DeploymentName, diagnostics: &mut Diagnostics) -> Event {
        let status = match self.runtime.workload_status(deployment).await {
            Ok(status) => status,
            Err(e) => return Event::ProbeFailed(e.to_string()),
        };

        tracing::debug!(
            %deployment,
            desired = status.desired_replicas,
            ready = status.ready_replicas,
            updated = status.updated_replicas,
            "rollout progress"
        );

        if is_ready(&status) {
            return Event::Observed(Readiness::Ready);
        }

        match self.runtime.list_pods(deployment).await {
            Ok(pods) => Event::Observed(assess(&status, &pods)),
            Err(e) => {
                diagnostics.warn(Warning::pod_listing(format!(
                    "failed to list pods of {deployment}: {e}"
                )));
                Event::Observed(Readiness::Progressing)
            }
        }
    }

    async fn decide_rollback(&self, state: &RolloutState) -> Event {
        if !state.has_previous_image() {
            return Event::NoRollbackTarget;
        }

        let approved = match self.confirm {
            None => true,
            Some(confirm) => {
                let cause = state
                    .cause()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let prompt = format!(
                    "Rollout of {} failed ({cause}). Roll back container {} to {}?",
                    state.deployment, state.container, state.previous_image
                );
                confirm.confirm(&prompt).await
            }
        };

        if approved {
            Event::RollbackApproved
        } else {
            Event::RollbackDeclined
        }
    }

    async fn revert(&self, state: &RolloutState) -> Event {
        tracing::info!(
            deployment = %state.deployment,
            container = %state.container,
            image = %state.previous_image,
            "rolling back"
        );

        match self
            .runtime
            .patch_container_image(&state.deployment, &state.container, &state.previous_image)
            .await
        {
            Ok(()) => Event::Reverted,
            Err(e) => Event::RevertFailed(e.to_string()),
        }
    }
}
