// ABOUTME: Set-image command implementation.
// ABOUTME: Runs the rollout supervisor and maps its terminal phase to the command result.

use setimg::diagnostics::Diagnostics;
use setimg::error::{Error, Result};
use setimg::output::Output;
use setimg::prompt::Confirm;
use setimg::rollout::{Phase, Supervisor, UpdateRequest, WatchOptions};
use setimg::workload::WorkloadRuntime;

/// Patch the image and supervise the rollout.
///
/// `diag` may already hold warnings from choosing the image; they are
/// printed together with the rollout's own, whatever the outcome.
pub async fn set_image<W: WorkloadRuntime + ?Sized>(
    runtime: &W,
    request: &UpdateRequest,
    options: WatchOptions,
    confirm: &dyn Confirm,
    mut diag: Diagnostics,
    output: &mut Output,
) -> Result<()> {
    output.start_timer();

    output.progress(&format!(
        "Updating deployment.apps/{} container {} to {}...",
        request.deployment, request.container, request.image
    ));
    if request.watch {
        output.progress(&format!(
            "Watching the rollout for up to {}...",
            humantime::format_duration(options.timeout)
        ));
    }

    let result = Supervisor::new(runtime, options)
        .with_confirmation(confirm)
        .run(request, &mut diag)
        .await;
    output.diagnostics(&diag);
    let state = result?;

    output.rollout(&state);
    match state.phase() {
        Phase::Ready => Ok(()),
        Phase::RolledBack => Err(Error::RolledBack(state.summary())),
        Phase::RollbackFailed => Err(Error::RollbackFailed(state.summary())),
        _ => Err(Error::RolloutFailed(state.summary())),
    }
}
