// ABOUTME: Kubernetes implementation of the workload runtime using kube-rs.
// ABOUTME: Reads deployments and pods, patches container images via strategic merge.

use super::{ContainerInfo, PodStatus, WorkloadError, WorkloadRuntime, WorkloadStatus};
use crate::types::{ContainerName, DeploymentName};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_get_error(e: kube::Error, deployment: &DeploymentName) -> WorkloadError {
    match &e {
        kube::Error::Api(response) if response.code == 404 => {
            WorkloadError::NotFound(deployment.to_string())
        }
        _ => WorkloadError::Api(e.to_string()),
    }
}

fn map_patch_error(e: kube::Error, deployment: &DeploymentName) -> WorkloadError {
    match &e {
        kube::Error::Api(response) if response.code == 404 => {
            WorkloadError::NotFound(deployment.to_string())
        }
        _ => WorkloadError::PatchFailed(deployment.to_string(), e.to_string()),
    }
}

// =============================================================================
// Conversion Helpers
// =============================================================================

fn template_containers(deployment: &Deployment) -> Vec<ContainerInfo> {
    deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .map(|pod| {
            pod.containers
                .iter()
                .enumerate()
                .map(|(index, c)| ContainerInfo {
                    index,
                    name: c.name.clone(),
                    image: c.image.clone().unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn replica_counts(deployment: &Deployment) -> WorkloadStatus {
    // An unset replica count means the API server default of one.
    let desired_replicas = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or(1);
    let status = deployment.status.as_ref();

    WorkloadStatus {
        desired_replicas,
        ready_replicas: status.and_then(|s| s.ready_replicas).unwrap_or(0),
        updated_replicas: status.and_then(|s| s.updated_replicas).unwrap_or(0),
    }
}

/// Label selector for the deployment's pods, `app=<name>` when unset.
fn pod_selector(deployment: &Deployment, name: &DeploymentName) -> String {
    let labels = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.selector.match_labels.as_ref())
        .filter(|labels| !labels.is_empty());

    match labels {
        Some(labels) => labels
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(","),
        None => format!("app={name}"),
    }
}

fn pod_status(pod: Pod) -> PodStatus {
    let status = pod.status.unwrap_or_default();
    let containers = status
        .container_statuses
        .unwrap_or_default()
        .into_iter()
        .map(|c| super::ContainerStatus {
            name: c.name,
            restart_count: c.restart_count,
            waiting_reason: c.state.and_then(|s| s.waiting).and_then(|w| w.reason),
        })
        .collect();

    PodStatus {
        name: pod.metadata.name.unwrap_or_default(),
        phase: status.phase,
        containers,
    }
}

// =============================================================================
// KubeWorkloads
// =============================================================================

/// Deployments of one namespace in one cluster context.
pub struct KubeWorkloads {
    client: Client,
    namespace: String,
}

impl KubeWorkloads {
    /// Connect using the local kubeconfig.
    ///
    /// `context` selects a kubeconfig context; without it the current
    /// context (or the in-cluster environment) is used. `namespace` defaults
    /// to the context's namespace.
    pub async fn connect(
        namespace: Option<&str>,
        context: Option<&str>,
    ) -> Result<Self, WorkloadError> {
        let config = match context {
            Some(context) => {
                let kubeconfig =
                    Kubeconfig::read().map_err(|e| WorkloadError::Config(e.to_string()))?;
                let options = KubeConfigOptions {
                    context: Some(context.to_string()),
                    ..Default::default()
                };
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| WorkloadError::Config(e.to_string()))?
            }
            None => Config::infer()
                .await
                .map_err(|e| WorkloadError::Config(e.to_string()))?,
        };

        let namespace = namespace
            .map(str::to_string)
            .unwrap_or_else(|| config.default_namespace.clone());
        let client = Client::try_from(config).map_err(|e| WorkloadError::Config(e.to_string()))?;

        tracing::debug!(namespace = %namespace, "connected to cluster");
        Ok(Self { client, namespace })
    }

    /// Namespace all operations run in.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn deployments(&self) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn pods(&self) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    async fn get(&self, deployment: &DeploymentName) -> Result<Deployment, WorkloadError> {
        self.deployments()
            .get(deployment.as_str())
            .await
            .map_err(|e| map_get_error(e, deployment))
    }
}

#[async_trait]
impl WorkloadRuntime for KubeWorkloads {
    async fn list_deployments(&self) -> Result<Vec<String>, WorkloadError> {
        let list = self
            .deployments()
            .list(&ListParams::default())
            .await
            .map_err(|e| WorkloadError::Api(e.to_string()))?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|d| d.metadata.name)
            .collect())
    }

    async fn containers(
        &self,
        deployment: &DeploymentName,
    ) -> Result<Vec<ContainerInfo>, WorkloadError> {
        let object = self.get(deployment).await?;
        Ok(template_containers(&object))
    }

    async fn workload_status(
        &self,
        deployment: &DeploymentName,
    ) -> Result<WorkloadStatus, WorkloadError> {
        let object = self.get(deployment).await?;
        Ok(replica_counts(&object))
    }

    async fn list_pods(&self, deployment: &DeploymentName) -> Result<Vec<PodStatus>, WorkloadError> {
        let object = self.get(deployment).await?;
        let selector = pod_selector(&object, deployment);

        let pods = self
            .pods()
            .list(&ListParams::default().labels(&selector))
            .await
            .map_err(|e| WorkloadError::Api(e.to_string()))?;

        Ok(pods.items.into_iter().map(pod_status).collect())
    }

    async fn patch_container_image(
        &self,
        deployment: &DeploymentName,
        container: &ContainerName,
        image: &str,
    ) -> Result<(), WorkloadError> {
        let patch = serde_json::json!({
            "spec": {
                "template": {
                    "spec": {
                        "containers": [{ "name": container.as_str(), "image": image }]
                    }
                }
            }
        });

        self.deployments()
            .patch(
                deployment.as_str(),
                &PatchParams::default(),
                &Patch::Strategic(&patch),
            )
            .await
            .map_err(|e| map_patch_error(e, deployment))?;

        tracing::debug!(%deployment, %container, image, "patched container image");
        Ok(())
    }
}
