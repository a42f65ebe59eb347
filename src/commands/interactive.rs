// ABOUTME: Interactive selection of deployment, container, and image tag.
// ABOUTME: Falls back to manual image entry when the registry cannot list tags.

use setimg::diagnostics::{Diagnostics, Warning};
use setimg::error::{Error, Result};
use setimg::output::Output;
use setimg::prompt::{self, TagChoice};
use setimg::registry::ProviderRegistry;
use setimg::rollout::UpdateRequest;
use setimg::types::{ContainerName, DeploymentName, ImageRef};
use setimg::workload::WorkloadRuntime;

/// Prompt for whatever the command line left out.
pub async fn select_update<W: WorkloadRuntime + ?Sized>(
    runtime: &W,
    registry: &ProviderRegistry,
    deployment: Option<DeploymentName>,
    container: Option<ContainerName>,
    watch: bool,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<UpdateRequest> {
    let deployment = match deployment {
        Some(deployment) => deployment,
        None => {
            output.progress("Loading deployments...");
            let names = runtime.list_deployments().await?;
            if names.is_empty() {
                return Err(Error::NoDeployments);
            }
            let index = prompt::select_deployment(&names)?;
            DeploymentName::new(&names[index])?
        }
    };

    let (container, current_image) = match container {
        Some(container) => {
            let image = runtime.current_image(&deployment, &container).await?;
            (container, image)
        }
        None => {
            output.progress("Loading containers...");
            let containers = runtime.containers(&deployment).await?;
            if containers.is_empty() {
                return Err(Error::NoContainers(deployment.to_string()));
            }
            let selected = &containers[prompt::select_container(&containers)?];
            (ContainerName::new(&selected.name)?, selected.image.clone())
        }
    };

    output.progress("Loading image tags...");
    let image = match registry.list_tags_with_time(&current_image).await {
        Ok(tags) => match prompt::select_tag(&current_image, &tags)? {
            TagChoice::Tag(tag) => ImageRef::parse(&current_image)?.with_tag(&tag),
            TagChoice::Manual => prompt::input_image(&current_image)?,
        },
        Err(e) if e.allows_manual_fallback() => {
            diag.warn(Warning::tag_listing(format!(
                "failed to fetch tags, falling back to manual input: {e}"
            )));
            prompt::input_image(&current_image)?
        }
        Err(e) => return Err(e.into()),
    };

    if image.is_empty() {
        return Err(Error::InvalidArguments("image must not be empty".to_string()));
    }

    output.progress(&format!(
        "Selected:\n   Deployment: {deployment}\n   Container:  {container}\n   New Image:  {image}\n"
    ));

    Ok(UpdateRequest {
        deployment,
        container,
        image,
        watch,
    })
}
