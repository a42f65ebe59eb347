// ABOUTME: Watch and rollback settings for the rollout supervisor.
// ABOUTME: Durations use humantime syntax with defaults matching the CLI.

use crate::rollout::{DEFAULT_POLL_INTERVAL, DEFAULT_WATCH_TIMEOUT, WatchOptions};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSettings {
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            interval: default_interval(),
        }
    }
}

impl WatchSettings {
    /// Supervisor options, with `timeout` overriding the configured deadline.
    pub fn options(&self, timeout: Option<Duration>) -> WatchOptions {
        WatchOptions {
            timeout: timeout.unwrap_or(self.timeout),
            interval: self.interval,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollbackSettings {
    /// Ask before rolling back in interactive mode.
    #[serde(default = "default_confirm")]
    pub confirm: bool,
}

impl Default for RollbackSettings {
    fn default() -> Self {
        Self {
            confirm: default_confirm(),
        }
    }
}

fn default_timeout() -> Duration {
    DEFAULT_WATCH_TIMEOUT
}

fn default_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_confirm() -> bool {
    true
}
