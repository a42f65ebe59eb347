// ABOUTME: Multi-registry tag resolution: backend trait, tag records, ordering policy.
// ABOUTME: Re-exports the provider registry, built-in backends and the tag enricher.

mod auth;
mod ecr;
mod enrich;
mod error;
mod gcp;
mod generic;
mod oci;
mod provider;

pub use auth::CredentialSource;
pub use ecr::{
    AwsEcrDescriber, EcrBackend, EcrRepository, ImageDescriber, ImageDetail, ImageDetailPage,
    MAX_DESCRIBED_IMAGES, parse_ecr_reference,
};
pub use enrich::{
    CreatedAtFetcher, MAX_CONCURRENT_LOOKUPS, MAX_ENRICHED_TAGS, TagEnricher, VERY_OLD,
};
pub use error::RegistryError;
pub use gcp::GcpBackend;
pub use generic::GenericBackend;
pub use oci::OciTagSource;
pub use provider::ProviderRegistry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;

/// Upper bound on the number of tags handed back to callers.
pub const MAX_LISTED_TAGS: usize = 20;

/// A tag and, when known, when its image was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub tag: String,
    /// [`VERY_OLD`] when the registry reported no usable time; serialized as null.
    #[serde(serialize_with = "serialize_known_time")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TagRecord {
    pub fn new(tag: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            tag: tag.into(),
            created_at: Some(created_at),
        }
    }

    /// A record whose creation time could not be determined.
    pub fn untimed(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            created_at: None,
        }
    }

    /// The creation time, unless it is missing or the [`VERY_OLD`] sentinel.
    pub fn known_created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.filter(|t| *t != VERY_OLD)
    }
}

fn serialize_known_time<S: Serializer>(
    created_at: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    created_at.filter(|t| *t != VERY_OLD).serialize(serializer)
}

/// Newest first; records without a timestamp after every timestamped one.
fn newest_first(a: &TagRecord, b: &TagRecord) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable newest-first sort followed by truncation to [`MAX_LISTED_TAGS`].
pub fn order_newest_first(mut records: Vec<TagRecord>) -> Vec<TagRecord> {
    records.sort_by(newest_first);
    records.truncate(MAX_LISTED_TAGS);
    records
}

/// Alphabetical fallback used when no creation time could be resolved.
pub fn order_alphabetically<S: AsRef<str>>(tags: &[S]) -> Vec<TagRecord> {
    let mut names: Vec<&str> = tags.iter().map(AsRef::as_ref).collect();
    names.sort_unstable();
    names
        .into_iter()
        .take(MAX_LISTED_TAGS)
        .map(TagRecord::untimed)
        .collect()
}

/// Raw tag listing for one registry family; per-tag metadata comes from
/// the [`CreatedAtFetcher`] supertrait.
#[async_trait]
pub trait TagSource: CreatedAtFetcher {
    /// List every tag of `repository` (a reference with tag/digest stripped).
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError>;
}

/// A registry backend: recognizes references and lists their tags.
#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Display name used in diagnostics.
    fn name(&self) -> &str;

    /// Whether this backend understands `reference`.
    fn supports(&self, reference: &str) -> bool;

    /// Tags with creation times, newest first, at most [`MAX_LISTED_TAGS`].
    async fn list_tags_with_time(&self, reference: &str) -> Result<Vec<TagRecord>, RegistryError>;

    /// Tag names in the same order as [`RegistryBackend::list_tags_with_time`].
    async fn list_tags(&self, reference: &str) -> Result<Vec<String>, RegistryError> {
        let records = self.list_tags_with_time(reference).await?;
        Ok(records.into_iter().map(|r| r.tag).collect())
    }
}

/// List raw tags from `source` and enrich them with creation times.
///
/// Shared by the backends whose listing call carries no timestamps.
pub(crate) async fn list_and_enrich<S: TagSource + ?Sized>(
    source: &S,
    enricher: &TagEnricher,
    reference: &str,
) -> Result<Vec<TagRecord>, RegistryError> {
    let parsed = crate::types::ImageRef::parse(reference)
        .map_err(|e| RegistryError::InvalidReference(reference.to_string(), e.to_string()))?;
    let repository = parsed.repository();

    let tags = source.list_tags(&repository).await?;
    if tags.is_empty() {
        return Err(RegistryError::NoTags(repository));
    }

    Ok(enricher.enrich(source, &repository, tags).await)
}
