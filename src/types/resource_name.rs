// ABOUTME: DNS-compatible Kubernetes resource name validation.
// ABOUTME: Deployments are RFC 1123 subdomains, containers are RFC 1123 labels.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceNameError {
    #[error("{kind} name cannot be empty")]
    Empty { kind: &'static str },

    #[error("{kind} name exceeds maximum length of {max} characters")]
    TooLong { kind: &'static str, max: usize },

    #[error("{kind} name must start and end with an alphanumeric character")]
    BadBoundary { kind: &'static str },

    #[error("{kind} name must be lowercase")]
    NotLowercase { kind: &'static str },

    #[error("invalid character in {kind} name: '{c}'")]
    InvalidChar { kind: &'static str, c: char },
}

fn validate(
    value: &str,
    kind: &'static str,
    max: usize,
    allow_dot: bool,
) -> Result<(), ResourceNameError> {
    if value.is_empty() {
        return Err(ResourceNameError::Empty { kind });
    }

    if value.len() > max {
        return Err(ResourceNameError::TooLong { kind, max });
    }

    for c in value.chars() {
        if c.is_ascii_uppercase() {
            return Err(ResourceNameError::NotLowercase { kind });
        }
        let allowed =
            c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || (allow_dot && c == '.');
        if !allowed {
            return Err(ResourceNameError::InvalidChar { kind, c });
        }
    }

    let is_alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let first = value.chars().next().is_some_and(is_alnum);
    let last = value.chars().next_back().is_some_and(is_alnum);
    if !first || !last {
        return Err(ResourceNameError::BadBoundary { kind });
    }

    Ok(())
}

/// Name of a Deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeploymentName(String);

impl DeploymentName {
    pub fn new(value: &str) -> Result<Self, ResourceNameError> {
        validate(value, "deployment", 253, true)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeploymentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a container within a pod template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerName(String);

impl ContainerName {
    pub fn new(value: &str) -> Result<Self, ResourceNameError> {
        validate(value, "container", 63, false)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
