// ABOUTME: Workload runtime boundary: read deployment state, list pods, patch images.
// ABOUTME: The kube-rs implementation lives in the kubernetes submodule.

mod kubernetes;

pub use kubernetes::KubeWorkloads;

use crate::types::{ContainerName, DeploymentName};
use async_trait::async_trait;

/// A container of a deployment's pod template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Position in the pod template.
    pub index: usize,
    pub name: String,
    pub image: String,
}

/// Replica counts of a deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkloadStatus {
    pub desired_replicas: i32,
    pub ready_replicas: i32,
    pub updated_replicas: i32,
}

/// Observed state of one pod.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodStatus {
    pub name: String,
    /// Pod phase as reported by the cluster (`Pending`, `Running`, `Failed`, ...).
    pub phase: Option<String>,
    pub containers: Vec<ContainerStatus>,
}

/// Observed state of one container in a pod.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStatus {
    pub name: String,
    pub restart_count: i32,
    /// Reason reported while the container is in the waiting state.
    pub waiting_reason: Option<String>,
}

/// Errors from workload operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    #[error("deployment {0} not found")]
    NotFound(String),

    #[error("container {container} not found in deployment {deployment}")]
    ContainerNotFound {
        deployment: String,
        container: String,
    },

    #[error("failed to load cluster configuration: {0}")]
    Config(String),

    #[error("failed to patch deployment {0}: {1}")]
    PatchFailed(String, String),

    #[error("cluster API error: {0}")]
    Api(String),
}

/// Operations the rollout code needs from the cluster.
#[async_trait]
pub trait WorkloadRuntime: Send + Sync {
    /// Names of all deployments in the namespace.
    async fn list_deployments(&self) -> Result<Vec<String>, WorkloadError>;

    /// Containers of the deployment's pod template, in template order.
    async fn containers(
        &self,
        deployment: &DeploymentName,
    ) -> Result<Vec<ContainerInfo>, WorkloadError>;

    /// Replica counts of the deployment.
    async fn workload_status(
        &self,
        deployment: &DeploymentName,
    ) -> Result<WorkloadStatus, WorkloadError>;

    /// Pods selected by the deployment.
    async fn list_pods(&self, deployment: &DeploymentName) -> Result<Vec<PodStatus>, WorkloadError>;

    /// Set the image of one container in the pod template.
    async fn patch_container_image(
        &self,
        deployment: &DeploymentName,
        container: &ContainerName,
        image: &str,
    ) -> Result<(), WorkloadError>;

    /// Image currently configured for `container`.
    async fn current_image(
        &self,
        deployment: &DeploymentName,
        container: &ContainerName,
    ) -> Result<String, WorkloadError> {
        self.containers(deployment)
            .await?
            .into_iter()
            .find(|c| c.name == container.as_str())
            .map(|c| c.image)
            .ok_or_else(|| WorkloadError::ContainerNotFound {
                deployment: deployment.to_string(),
                container: container.to_string(),
            })
    }
}
