// ABOUTME: Application-wide error types for kubectl-setimg.
// ABOUTME: Uses thiserror for ergonomic error handling and maps errors to exit codes.

use crate::registry::RegistryError;
use crate::rollout::RolloutError;
use crate::types::{ParseImageRefError, ResourceNameError};
use crate::workload::WorkloadError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("invalid name: {0}")]
    InvalidName(#[from] ResourceNameError),

    #[error("invalid image: {0}")]
    InvalidImage(#[from] ParseImageRefError),

    #[error("no deployments found")]
    NoDeployments,

    #[error("deployment {0} has no containers")]
    NoContainers(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Workload(#[from] WorkloadError),

    #[error(transparent)]
    Rollout(#[from] RolloutError),

    /// The watch failed and the previous image was restored.
    #[error("{0}")]
    RolledBack(String),

    /// The watch failed and no rollback happened.
    #[error("{0}")]
    RolloutFailed(String),

    /// The watch failed and restoring the previous image failed too.
    #[error("{0}")]
    RollbackFailed(String),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::RolledBack(_) => 2,
            Error::RollbackFailed(_) => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
