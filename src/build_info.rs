// ABOUTME: Build metadata embedded at compile time.
// ABOUTME: Git tag and commit are optional and supplied through the build environment.

use std::fmt;

/// Version information of this binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub git_commit: Option<String>,
    pub git_tag: Option<String>,
}

impl BuildInfo {
    /// Metadata of the running binary.
    pub fn current() -> Self {
        Self::new(
            env!("CARGO_PKG_VERSION"),
            option_env!("SETIMG_GIT_COMMIT"),
            option_env!("SETIMG_GIT_TAG"),
        )
    }

    /// Blank and `unknown` values count as absent.
    pub fn new(version: &str, git_commit: Option<&str>, git_tag: Option<&str>) -> Self {
        let known = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty() && *v != "unknown")
                .map(str::to_string)
        };

        Self {
            version: version.to_string(),
            git_commit: known(git_commit),
            git_tag: known(git_tag),
        }
    }

    /// Tag, else commit, else package version.
    pub fn display_version(&self) -> &str {
        self.git_tag
            .as_deref()
            .or(self.git_commit.as_deref())
            .unwrap_or(&self.version)
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kubectl-setimg version {}", self.display_version())
    }
}
