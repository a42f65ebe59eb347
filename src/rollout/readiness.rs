// ABOUTME: Readiness predicate and unhealthy-pod detection for a watched deployment.
// ABOUTME: Readiness wins over any pod failure observed in the same poll.

use crate::workload::{PodStatus, WorkloadStatus};
use std::fmt;
use std::time::Duration;

/// Restarts above this count mark a container as unhealthy.
pub const MAX_RESTARTS: i32 = 3;

/// Waiting reasons that mean the pod will not come up on its own.
pub const FATAL_WAIT_REASONS: [&str; 3] = ["ImagePullBackOff", "CrashLoopBackOff", "ErrImagePull"];

/// Result of one readiness poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Progressing,
    Unhealthy(FailureCause),
}

/// Why a watched rollout failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The deadline passed first.
    Timeout(Duration),
    /// The workload status could not be read.
    Probe(String),
    PodFailed {
        pod: String,
    },
    TooManyRestarts {
        pod: String,
        container: String,
        restarts: i32,
    },
    ContainerWaiting {
        pod: String,
        container: String,
        reason: String,
    },
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Timeout(d) => {
                write!(f, "timed out after {}", humantime::format_duration(*d))
            }
            FailureCause::Probe(reason) => write!(f, "failed to get deployment status: {reason}"),
            FailureCause::PodFailed { pod } => write!(f, "pod {pod} failed"),
            FailureCause::TooManyRestarts {
                pod,
                container,
                restarts,
            } => write!(
                f,
                "container {container} in pod {pod} restarted {restarts} times"
            ),
            FailureCause::ContainerWaiting {
                pod,
                container,
                reason,
            } => write!(f, "container {container} in pod {pod} is in {reason}"),
        }
    }
}

/// Every desired replica is both ready and updated.
pub fn is_ready(status: &WorkloadStatus) -> bool {
    status.ready_replicas == status.desired_replicas
        && status.updated_replicas == status.desired_replicas
}

/// First unhealthy pod or container, in listing order.
pub fn detect_failure(pods: &[PodStatus]) -> Option<FailureCause> {
    for pod in pods {
        if pod.phase.as_deref() == Some("Failed") {
            return Some(FailureCause::PodFailed {
                pod: pod.name.clone(),
            });
        }

        for container in &pod.containers {
            if container.restart_count > MAX_RESTARTS {
                return Some(FailureCause::TooManyRestarts {
                    pod: pod.name.clone(),
                    container: container.name.clone(),
                    restarts: container.restart_count,
                });
            }

            if let Some(reason) = container
                .waiting_reason
                .as_deref()
                .filter(|reason| FATAL_WAIT_REASONS.contains(reason))
            {
                return Some(FailureCause::ContainerWaiting {
                    pod: pod.name.clone(),
                    container: container.name.clone(),
                    reason: reason.to_string(),
                });
            }
        }
    }

    None
}

/// Combine replica counts and pod states into one verdict.
pub fn assess(status: &WorkloadStatus, pods: &[PodStatus]) -> Readiness {
    if is_ready(status) {
        return Readiness::Ready;
    }
    match detect_failure(pods) {
        Some(cause) => Readiness::Unhealthy(cause),
        None => Readiness::Progressing,
    }
}
