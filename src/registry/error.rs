// ABOUTME: Error types for registry dispatch, listing, and tag lookups.
// ABOUTME: Classification misses and listing failures surface as a single value.

/// Errors from resolving or listing image tags.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No registered backend recognizes the reference.
    #[error("no registry backend supports image {reference} (available: {})", available.join(", "))]
    NoBackend {
        reference: String,
        available: Vec<String>,
    },

    /// The reference could not be parsed.
    #[error("invalid image reference {0}: {1}")]
    InvalidReference(String, String),

    /// Credentials were rejected or could not be obtained.
    #[error("authentication failed for {0}: {1}")]
    Auth(String, String),

    /// The listing call failed (unreachable registry, API error).
    #[error("failed to list tags for {0}: {1}")]
    ListFailed(String, String),

    /// The listing call succeeded but returned nothing to choose from.
    #[error("no tags found for image {0}")]
    NoTags(String),

    /// A single tag's metadata lookup failed.
    #[error("failed to get creation time for tag {tag}: {reason}")]
    LookupFailed { tag: String, reason: String },
}

impl RegistryError {
    /// Whether the caller should offer manual image entry instead.
    pub fn allows_manual_fallback(&self) -> bool {
        !matches!(self, RegistryError::LookupFailed { .. })
    }
}
