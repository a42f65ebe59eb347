// ABOUTME: Non-fatal warnings gathered while picking an image and watching a rollout.
// ABOUTME: Repeated identical warnings from consecutive polls collapse into one entry.

use std::fmt;

/// Warnings that did not stop the command but belong in its output.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record `warning` and log it. A warning identical to the previous one
    /// only bumps that entry's repeat count.
    pub fn warn(&mut self, warning: Warning) {
        if let Some(last) = self.warnings.last_mut() {
            if last.kind == warning.kind && last.message == warning.message {
                last.repeats += 1;
                tracing::debug!(kind = %warning.kind, repeats = last.repeats, "{}", warning.message);
                return;
            }
        }

        tracing::warn!(kind = %warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    /// How many times in a row this warning was recorded.
    pub repeats: usize,
}

impl Warning {
    fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            repeats: 1,
        }
    }

    /// Pods could not be listed during a readiness poll.
    pub fn pod_listing(message: impl Into<String>) -> Self {
        Self::new(WarningKind::PodListing, message)
    }

    /// Tags could not be listed and the image was entered by hand.
    pub fn tag_listing(message: impl Into<String>) -> Self {
        Self::new(WarningKind::TagListing, message)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.repeats > 1 {
            write!(f, "{} (x{})", self.message, self.repeats)
        } else {
            f.write_str(&self.message)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The poll counted as progressing.
    PodListing,
    TagListing,
}

impl WarningKind {
    /// Stable name used in JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            WarningKind::PodListing => "pod_listing",
            WarningKind::TagListing => "tag_listing",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
