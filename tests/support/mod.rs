// ABOUTME: Test support utilities.
// ABOUTME: In-memory fakes for the registry and workload capability boundaries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use setimg::prompt::Confirm;
use setimg::registry::{
    CreatedAtFetcher, EcrRepository, ImageDescriber, ImageDetailPage, RegistryError, TagSource,
};
use setimg::types::{ContainerName, DeploymentName};
use setimg::workload::{ContainerInfo, PodStatus, WorkloadError, WorkloadRuntime, WorkloadStatus};
use std::collections::{HashMap, VecDeque};
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("setimg=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

// =============================================================================
// Registry fakes
// =============================================================================

/// Creation-time lookups with scripted outcomes, latency, and in-flight tracking.
#[derive(Default)]
#[allow(dead_code)]
pub struct InstrumentedFetcher {
    outcomes: HashMap<String, Result<Option<DateTime<Utc>>, String>>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    attempted: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl InstrumentedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(mut self, tag: &str, at: DateTime<Utc>) -> Self {
        self.outcomes.insert(tag.to_string(), Ok(Some(at)));
        self
    }

    pub fn without_time(mut self, tag: &str) -> Self {
        self.outcomes.insert(tag.to_string(), Ok(None));
        self
    }

    pub fn failing(mut self, tag: &str) -> Self {
        self.outcomes
            .insert(tag.to_string(), Err("manifest unknown".to_string()));
        self
    }

    /// Latency of every lookup without its own delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn delay_for(mut self, tag: &str, delay: Duration) -> Self {
        self.delays.insert(tag.to_string(), delay);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn attempted(&self) -> Vec<String> {
        self.attempted.lock().clone()
    }
}

#[async_trait]
impl CreatedAtFetcher for InstrumentedFetcher {
    async fn fetch_created_at(
        &self,
        _repository: &str,
        tag: &str,
    ) -> Result<Option<DateTime<Utc>>, RegistryError> {
        self.attempted.lock().push(tag.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(tag).copied().unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        // Unscripted tags fail like a missing manifest.
        match self.outcomes.get(tag) {
            Some(Ok(created)) => Ok(*created),
            Some(Err(reason)) => Err(RegistryError::LookupFailed {
                tag: tag.to_string(),
                reason: reason.clone(),
            }),
            None => Err(RegistryError::LookupFailed {
                tag: tag.to_string(),
                reason: "not scripted".to_string(),
            }),
        }
    }
}

/// A tag source with a fixed listing, backed by an [`InstrumentedFetcher`].
#[allow(dead_code)]
pub struct ScriptedTagSource {
    tags: Result<Vec<String>, String>,
    pub fetcher: InstrumentedFetcher,
    listed: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedTagSource {
    pub fn new(tags: &[&str], fetcher: InstrumentedFetcher) -> Self {
        Self {
            tags: Ok(tags.iter().map(|t| t.to_string()).collect()),
            fetcher,
            listed: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            tags: Err("connection refused".to_string()),
            fetcher: InstrumentedFetcher::new(),
            listed: Mutex::new(Vec::new()),
        }
    }

    /// Repositories passed to `list_tags`.
    pub fn listed(&self) -> Vec<String> {
        self.listed.lock().clone()
    }
}

#[async_trait]
impl CreatedAtFetcher for ScriptedTagSource {
    async fn fetch_created_at(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Option<DateTime<Utc>>, RegistryError> {
        self.fetcher.fetch_created_at(repository, tag).await
    }
}

#[async_trait]
impl TagSource for ScriptedTagSource {
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        self.listed.lock().push(repository.to_string());
        self.tags
            .clone()
            .map_err(|reason| RegistryError::ListFailed(repository.to_string(), reason))
    }
}

/// ECR describe-images pages served in order.
#[allow(dead_code)]
pub struct FakeDescriber {
    pages: Vec<ImageDetailPage>,
    tokens: Mutex<Vec<Option<String>>>,
}

#[allow(dead_code)]
impl FakeDescriber {
    pub fn new(pages: Vec<ImageDetailPage>) -> Self {
        Self {
            pages,
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Continuation tokens received, one entry per call.
    pub fn tokens(&self) -> Vec<Option<String>> {
        self.tokens.lock().clone()
    }
}

#[async_trait]
impl ImageDescriber for FakeDescriber {
    async fn describe_images(
        &self,
        repository: &EcrRepository,
        next_token: Option<String>,
    ) -> Result<ImageDetailPage, RegistryError> {
        let call = {
            let mut tokens = self.tokens.lock();
            tokens.push(next_token);
            tokens.len() - 1
        };
        self.pages.get(call).cloned().ok_or_else(|| {
            RegistryError::ListFailed(repository.repository.clone(), "no more pages".to_string())
        })
    }
}

// =============================================================================
// Workload fakes
// =============================================================================

#[allow(dead_code)]
pub fn progressing(desired: i32, ready: i32) -> WorkloadStatus {
    WorkloadStatus {
        desired_replicas: desired,
        ready_replicas: ready,
        updated_replicas: ready,
    }
}

#[allow(dead_code)]
pub fn ready(replicas: i32) -> WorkloadStatus {
    WorkloadStatus {
        desired_replicas: replicas,
        ready_replicas: replicas,
        updated_replicas: replicas,
    }
}

#[derive(Default)]
struct WorkloadState {
    deployments: Vec<String>,
    containers: Vec<ContainerInfo>,
    statuses: VecDeque<Result<WorkloadStatus, String>>,
    pods: Vec<PodStatus>,
    pod_error: Option<String>,
    failing_images: Vec<String>,
    patches: Vec<String>,
    status_calls: usize,
}

/// One deployment named `web` held in memory.
///
/// Scripted statuses are served in order; the last one repeats.
#[allow(dead_code)]
pub struct FakeWorkloads {
    state: Mutex<WorkloadState>,
}

#[allow(dead_code)]
impl FakeWorkloads {
    pub fn new(container: &str, image: &str) -> Self {
        let state = WorkloadState {
            deployments: vec!["web".to_string()],
            containers: vec![ContainerInfo {
                index: 0,
                name: container.to_string(),
                image: image.to_string(),
            }],
            statuses: VecDeque::from([Ok(progressing(1, 0))]),
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn deployment() -> DeploymentName {
        DeploymentName::new("web").unwrap()
    }

    pub fn with_statuses(self, statuses: Vec<WorkloadStatus>) -> Self {
        self.state.lock().statuses = statuses.into_iter().map(Ok).collect();
        self
    }

    pub fn with_status_error(self, reason: &str) -> Self {
        self.state.lock().statuses = VecDeque::from([Err(reason.to_string())]);
        self
    }

    pub fn with_pods(self, pods: Vec<PodStatus>) -> Self {
        self.state.lock().pods = pods;
        self
    }

    pub fn with_pod_listing_error(self, reason: &str) -> Self {
        self.state.lock().pod_error = Some(reason.to_string());
        self
    }

    /// Patching to `image` is rejected by the fake API server.
    pub fn rejecting(self, image: &str) -> Self {
        self.state.lock().failing_images.push(image.to_string());
        self
    }

    /// Images written by successful patches, in order.
    pub fn patches(&self) -> Vec<String> {
        self.state.lock().patches.clone()
    }

    pub fn status_calls(&self) -> usize {
        self.state.lock().status_calls
    }

    fn check(&self, deployment: &DeploymentName) -> Result<(), WorkloadError> {
        if self
            .state
            .lock()
            .deployments
            .iter()
            .any(|d| d == deployment.as_str())
        {
            Ok(())
        } else {
            Err(WorkloadError::NotFound(deployment.to_string()))
        }
    }
}

#[async_trait]
impl WorkloadRuntime for FakeWorkloads {
    async fn list_deployments(&self) -> Result<Vec<String>, WorkloadError> {
        Ok(self.state.lock().deployments.clone())
    }

    async fn containers(
        &self,
        deployment: &DeploymentName,
    ) -> Result<Vec<ContainerInfo>, WorkloadError> {
        self.check(deployment)?;
        Ok(self.state.lock().containers.clone())
    }

    async fn workload_status(
        &self,
        deployment: &DeploymentName,
    ) -> Result<WorkloadStatus, WorkloadError> {
        self.check(deployment)?;
        let mut state = self.state.lock();
        state.status_calls += 1;
        let next = if state.statuses.len() > 1 {
            state.statuses.pop_front()
        } else {
            state.statuses.front().cloned()
        };
        match next {
            Some(Ok(status)) => Ok(status),
            Some(Err(reason)) => Err(WorkloadError::Api(reason)),
            None => Ok(progressing(1, 0)),
        }
    }

    async fn list_pods(&self, deployment: &DeploymentName) -> Result<Vec<PodStatus>, WorkloadError> {
        self.check(deployment)?;
        let state = self.state.lock();
        match &state.pod_error {
            Some(reason) => Err(WorkloadError::Api(reason.clone())),
            None => Ok(state.pods.clone()),
        }
    }

    async fn patch_container_image(
        &self,
        deployment: &DeploymentName,
        container: &ContainerName,
        image: &str,
    ) -> Result<(), WorkloadError> {
        self.check(deployment)?;
        let mut state = self.state.lock();
        if state.failing_images.iter().any(|i| i == image) {
            return Err(WorkloadError::PatchFailed(
                deployment.to_string(),
                "admission webhook denied the request".to_string(),
            ));
        }
        let Some(target) = state
            .containers
            .iter_mut()
            .find(|c| c.name == container.as_str())
        else {
            return Err(WorkloadError::ContainerNotFound {
                deployment: deployment.to_string(),
                container: container.to_string(),
            });
        };
        target.image = image.to_string();
        state.patches.push(image.to_string());
        Ok(())
    }
}

/// Answers every confirmation the same way and records the prompts.
#[allow(dead_code)]
pub struct RecordingConfirm {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingConfirm {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Confirm for RecordingConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answer
    }
}
