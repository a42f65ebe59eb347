// ABOUTME: List command implementation.
// ABOUTME: Prints the containers of a deployment with their current images.

use setimg::error::Result;
use setimg::output::Output;
use setimg::types::DeploymentName;
use setimg::workload::WorkloadRuntime;

pub async fn list_containers<W: WorkloadRuntime + ?Sized>(
    runtime: &W,
    deployment: &DeploymentName,
    output: &Output,
) -> Result<()> {
    let containers = runtime.containers(deployment).await?;
    output.containers(deployment.as_str(), &containers);
    Ok(())
}
