// ABOUTME: oci-client adapter that lists tags and reads image creation times.
// ABOUTME: Shared by the GCP and generic backends with different credential sources.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oci_client::client::ClientConfig;
use oci_client::secrets::RegistryAuth;
use oci_client::{Client, Reference};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use super::{CreatedAtFetcher, CredentialSource, RegistryError, TagSource};

/// Tags requested per page from the registry's tag list endpoint.
const TAG_PAGE_SIZE: usize = 1000;

/// Guard against registries that ignore the `last` cursor.
const MAX_TAG_PAGES: usize = 50;

/// The subset of an OCI image config this crate reads.
#[derive(Debug, Deserialize)]
struct ImageConfig {
    #[serde(default)]
    created: Option<DateTime<Utc>>,
}

/// Registry access through the OCI distribution API.
pub struct OciTagSource {
    client: Client,
    credentials: CredentialSource,
    resolved: Mutex<HashMap<String, RegistryAuth>>,
}

impl OciTagSource {
    pub fn new(credentials: CredentialSource) -> Self {
        Self {
            client: Client::new(ClientConfig::default()),
            credentials,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    fn parse(&self, reference: &str) -> Result<Reference, RegistryError> {
        reference
            .parse::<Reference>()
            .map_err(|e| RegistryError::InvalidReference(reference.to_string(), e.to_string()))
    }

    /// Credentials for the registry of `reference`, resolved once per host.
    async fn auth_for(&self, reference: &Reference) -> RegistryAuth {
        let registry = reference.resolve_registry().to_string();
        let cached = self.resolved.lock().get(&registry).cloned();
        if let Some(auth) = cached {
            return auth;
        }

        let auth = self.credentials.resolve(&registry).await;
        self.resolved.lock().insert(registry, auth.clone());
        auth
    }
}

#[async_trait]
impl CreatedAtFetcher for OciTagSource {
    async fn fetch_created_at(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Option<DateTime<Utc>>, RegistryError> {
        let lookup_failed = |reason: String| RegistryError::LookupFailed {
            tag: tag.to_string(),
            reason,
        };

        let base = self.parse(repository).map_err(|e| lookup_failed(e.to_string()))?;
        let reference = Reference::with_tag(
            base.registry().to_string(),
            base.repository().to_string(),
            tag.to_string(),
        );
        let auth = self.auth_for(&reference).await;

        let (_, _, config) = self
            .client
            .pull_manifest_and_config(&reference, &auth)
            .await
            .map_err(|e| lookup_failed(format!("failed to get image: {e}")))?;

        let config: ImageConfig = serde_json::from_str(&config)
            .map_err(|e| lookup_failed(format!("failed to get config: {e}")))?;

        Ok(config.created)
    }
}

#[async_trait]
impl TagSource for OciTagSource {
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        let reference = self.parse(repository)?;
        let auth = self.auth_for(&reference).await;

        let mut tags: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for _ in 0..MAX_TAG_PAGES {
            let last = tags.last().cloned();
            let page = self
                .client
                .list_tags(&reference, &auth, Some(TAG_PAGE_SIZE), last.as_deref())
                .await
                .map_err(|e| match e {
                    oci_client::errors::OciDistributionError::AuthenticationFailure(reason) => {
                        RegistryError::Auth(repository.to_string(), reason)
                    }
                    other => RegistryError::ListFailed(repository.to_string(), other.to_string()),
                })?;

            let received = page.tags.len();
            let before = tags.len();
            for tag in page.tags {
                if seen.insert(tag.clone()) {
                    tags.push(tag);
                }
            }

            if received < TAG_PAGE_SIZE || tags.len() == before {
                break;
            }
        }

        tracing::debug!(repository, count = tags.len(), "listed tags");
        Ok(tags)
    }
}
