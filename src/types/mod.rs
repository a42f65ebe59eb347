// ABOUTME: Validated domain types shared across registry and rollout code.
// ABOUTME: Image references and Kubernetes resource names.

mod image_ref;
mod resource_name;

pub use image_ref::{DEFAULT_REGISTRY, ImageRef, ParseImageRefError};
pub use resource_name::{ContainerName, DeploymentName, ResourceNameError};
