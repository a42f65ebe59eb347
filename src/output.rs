// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use crate::diagnostics::{Diagnostics, Warning};
use crate::registry::TagRecord;
use crate::rollout::{Phase, RolloutState};
use crate::workload::ContainerInfo;
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print every collected warning to stderr (suppressed in quiet mode).
    pub fn diagnostics(&self, diagnostics: &Diagnostics) {
        for warning in diagnostics.warnings() {
            if let Some(line) = self.warning_line(warning) {
                eprintln!("{line}");
            }
        }
    }

    fn warning_line(&self, warning: &Warning) -> Option<String> {
        match self.mode {
            OutputMode::Normal => Some(format!("Warning: {warning}")),
            OutputMode::Quiet => None,
            OutputMode::Json => serde_json::to_string(&WarningEvent {
                event: "warning",
                kind: warning.kind.as_str(),
                message: &warning.message,
                repeats: warning.repeats,
            })
            .ok(),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                // Print only the essential result
                println!("{message}");
            }
            OutputMode::Json => emit(&JsonEvent {
                event: "success",
                message,
                duration_secs: self.duration(),
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => emit_stderr(&JsonEvent {
                event: "error",
                message,
                duration_secs: self.duration(),
            }),
        }
    }

    /// Print available tags, newest first.
    pub fn tags(&self, image: &str, tags: &[TagRecord]) {
        match self.mode {
            OutputMode::Json => emit(&TagsEvent {
                event: "tags",
                image,
                tags,
            }),
            OutputMode::Quiet => {
                for record in tags {
                    println!("{}", record.tag);
                }
            }
            OutputMode::Normal => {
                let width = tags.iter().map(|r| r.tag.len()).max().unwrap_or(3).max(3);
                println!("{:<width$}  CREATED", "TAG");
                for record in tags {
                    let created = record
                        .known_created_at()
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:<width$}  {created}", record.tag);
                }
            }
        }
    }

    /// Print the containers of a deployment.
    pub fn containers(&self, deployment: &str, containers: &[ContainerInfo]) {
        match self.mode {
            OutputMode::Json => {
                let entries: Vec<ContainerEntry<'_>> = containers
                    .iter()
                    .map(|c| ContainerEntry {
                        index: c.index,
                        name: &c.name,
                        image: &c.image,
                    })
                    .collect();
                emit(&ContainersEvent {
                    event: "containers",
                    deployment,
                    containers: entries,
                });
            }
            OutputMode::Quiet => {
                for c in containers {
                    println!("{}={}", c.name, c.image);
                }
            }
            OutputMode::Normal => {
                println!("Containers in deployment {deployment}:");
                for c in containers {
                    println!("  {}. {} ({})", c.index + 1, c.name, c.image);
                }
            }
        }
    }

    /// Print the terminal state of a rollout.
    pub fn rollout(&self, state: &RolloutState) {
        let summary = state.summary();
        match self.mode {
            OutputMode::Json => emit(&RolloutEvent {
                event: "rollout",
                deployment: state.deployment.as_str(),
                container: state.container.as_str(),
                phase: state.phase().to_string(),
                image: &state.requested_image,
                previous_image: &state.previous_image,
                cause: state.cause().map(ToString::to_string),
                message: &summary,
                duration_secs: self.duration(),
            }),
            _ if state.phase() == Phase::Ready => self.success(&summary),
            // Failures surface as the command's error.
            _ => {}
        }
    }
}

fn emit<T: Serialize>(event: &T) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

fn emit_stderr<T: Serialize>(event: &T) {
    if let Ok(json) = serde_json::to_string(event) {
        eprintln!("{json}");
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct WarningEvent<'a> {
    event: &'a str,
    kind: &'a str,
    message: &'a str,
    repeats: usize,
}

#[derive(Serialize)]
struct TagsEvent<'a> {
    event: &'a str,
    image: &'a str,
    tags: &'a [TagRecord],
}

#[derive(Serialize)]
struct ContainerEntry<'a> {
    index: usize,
    name: &'a str,
    image: &'a str,
}

#[derive(Serialize)]
struct ContainersEvent<'a> {
    event: &'a str,
    deployment: &'a str,
    containers: Vec<ContainerEntry<'a>>,
}

#[derive(Serialize)]
struct RolloutEvent<'a> {
    event: &'a str,
    deployment: &'a str,
    container: &'a str,
    phase: String,
    image: &'a str,
    previous_image: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<String>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
