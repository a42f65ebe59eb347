// ABOUTME: Bounded concurrent lookup of tag creation times.
// ABOUTME: Tolerates per-tag failures and falls back to alphabetical order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream;

use super::{RegistryError, TagRecord, order_alphabetically, order_newest_first};

/// Only the first this many listed tags are ever looked up.
pub const MAX_ENRICHED_TAGS: usize = 50;

/// Upper bound on simultaneously outstanding lookups.
pub const MAX_CONCURRENT_LOOKUPS: usize = 10;

/// Stand-in for a missing or zero creation time; sorts after any real one.
pub const VERY_OLD: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

/// Per-image metadata lookup.
#[async_trait]
pub trait CreatedAtFetcher: Send + Sync {
    /// Creation time recorded in the image config of `repository:tag`.
    async fn fetch_created_at(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Option<DateTime<Utc>>, RegistryError>;
}

/// Maps bare tag names to timestamped records.
#[derive(Debug, Clone, Copy)]
pub struct TagEnricher {
    max_tags: usize,
    max_concurrent: usize,
}

impl Default for TagEnricher {
    fn default() -> Self {
        Self {
            max_tags: MAX_ENRICHED_TAGS,
            max_concurrent: MAX_CONCURRENT_LOOKUPS,
        }
    }
}

impl TagEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concurrency limit applied to a batch of `tag_count` tags.
    pub fn concurrency_for(&self, tag_count: usize) -> usize {
        self.max_concurrent.min(tag_count).max(1)
    }

    /// Resolve creation times for `tags` of `repository`.
    ///
    /// Never fails. Only the first [`MAX_ENRICHED_TAGS`] tags are looked up
    /// and only those whose lookup succeeded are returned, newest first. If
    /// every lookup fails, all listed tags come back in lexicographic order
    /// with no timestamps.
    pub async fn enrich<F>(&self, fetcher: &F, repository: &str, tags: Vec<String>) -> Vec<TagRecord>
    where
        F: CreatedAtFetcher + ?Sized,
    {
        let capped = &tags[..tags.len().min(self.max_tags)];

        let limit = self.concurrency_for(capped.len());
        tracing::debug!(
            repository,
            listed = tags.len(),
            tags = capped.len(),
            limit,
            "resolving tag creation times"
        );

        let mut outcomes: Vec<(usize, Result<TagRecord, RegistryError>)> =
            stream::iter(capped.iter().cloned().enumerate())
                .map(|(index, tag): (usize, String)| async move {
                    let outcome = fetcher
                        .fetch_created_at(repository, &tag)
                        .await
                        .map(|created| TagRecord::new(tag, normalize(created)));
                    (index, outcome)
                })
                .buffer_unordered(limit)
                .collect()
                .await;

        // Completion order is arbitrary; restore listing order so ties are stable.
        outcomes.sort_by_key(|(index, _)| *index);

        let mut records = Vec::with_capacity(outcomes.len());
        for (_, outcome) in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("{}", e),
            }
        }

        if records.is_empty() {
            tracing::warn!(
                repository,
                "failed to get creation time for any tags, falling back to alphabetical order"
            );
            return order_alphabetically(&tags);
        }

        order_newest_first(records)
    }
}

fn normalize(created: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match created {
        Some(t) if t != DateTime::<Utc>::UNIX_EPOCH => t,
        _ => VERY_OLD,
    }
}
