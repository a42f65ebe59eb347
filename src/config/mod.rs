// ABOUTME: Settings file parsing and discovery for setimg.yml.
// ABOUTME: Every field is optional; a missing file means defaults.

mod watch;

pub use watch::{RollbackSettings, WatchSettings};

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "setimg.yml";
pub const CONFIG_FILENAME_ALT: &str = "setimg.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".setimg/config.yml";

/// Environment variable naming a settings file.
pub const CONFIG_ENV: &str = "SETIMG_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub context: Option<String>,

    #[serde(default)]
    pub watch: WatchSettings,

    #[serde(default)]
    pub rollback: RollbackSettings,
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as a map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// First settings file found in `dir`, or defaults.
    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading settings");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Explicit path, then `SETIMG_CONFIG`, then discovery in `dir`.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Self::load(Path::new(&path));
        }
        Self::discover(dir)
    }

    fn find(dir: &Path) -> Option<PathBuf> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];
        candidates.into_iter().find(|path| path.exists())
    }

    fn validate(&self) -> Result<()> {
        if self.watch.interval.is_zero() {
            return Err(Error::InvalidConfig(
                "watch.interval must be greater than zero".to_string(),
            ));
        }
        if self.watch.timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "watch.timeout must be greater than zero".to_string(),
            ));
        }
        if self.namespace.as_deref() == Some("") {
            return Err(Error::InvalidConfig(
                "namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
