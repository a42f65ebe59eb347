// ABOUTME: Decides which mode a command line runs in: tags, list, direct, or interactive.
// ABOUTME: Incomplete direct-mode arguments switch to interactive selection instead of failing.

use crate::error::{Error, Result};
use crate::types::{ContainerName, DeploymentName};

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print the tags of an image and exit.
    Tags { image: String },
    /// Print the containers of a deployment.
    List { deployment: DeploymentName },
    /// Set `container=image` without prompting.
    Direct {
        deployment: DeploymentName,
        container: ContainerName,
        image: String,
    },
    /// Prompt for whatever is missing.
    Interactive {
        deployment: Option<DeploymentName>,
        container: Option<ContainerName>,
    },
}

impl Invocation {
    pub fn resolve(
        list: bool,
        tags: Option<String>,
        deployment: Option<&str>,
        target: Option<&str>,
    ) -> Result<Self> {
        if let Some(image) = tags {
            return Ok(Invocation::Tags { image });
        }

        let deployment = deployment.map(DeploymentName::new).transpose()?;

        if list {
            let deployment = deployment.ok_or_else(|| {
                Error::InvalidArguments("deployment name is required for --list".to_string())
            })?;
            return Ok(Invocation::List { deployment });
        }

        let Some(deployment) = deployment else {
            return Ok(Invocation::Interactive {
                deployment: None,
                container: None,
            });
        };

        let Some(target) = target else {
            return Ok(Invocation::Interactive {
                deployment: Some(deployment),
                container: None,
            });
        };

        match parse_assignment(target) {
            Some((container, image)) => Ok(Invocation::Direct {
                deployment,
                container: ContainerName::new(container)?,
                image: image.to_string(),
            }),
            // A bare container name selects only the image interactively.
            None => Ok(Invocation::Interactive {
                deployment: Some(deployment),
                container: Some(ContainerName::new(target)?),
            }),
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Invocation::Interactive { .. })
    }
}

/// Split `container=image`; exactly one `=` with both sides non-empty.
pub fn parse_assignment(value: &str) -> Option<(&str, &str)> {
    let (container, image) = value.split_once('=')?;
    if container.is_empty() || image.is_empty() || image.contains('=') {
        return None;
    }
    Some((container, image))
}
