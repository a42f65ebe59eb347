// ABOUTME: Google Container Registry and Artifact Registry backend.
// ABOUTME: Lists tags over the OCI API and enriches them with creation times.

use async_trait::async_trait;

use super::{
    CredentialSource, OciTagSource, RegistryBackend, RegistryError, TagEnricher, TagRecord,
    TagSource, list_and_enrich,
};
use crate::types::ImageRef;

/// Backend for hosts containing `gcr.io` or `pkg.dev`.
pub struct GcpBackend<S> {
    source: S,
    enricher: TagEnricher,
}

impl GcpBackend<OciTagSource> {
    /// Authenticates with application-default credentials, anonymous otherwise.
    pub fn oci() -> Self {
        Self::new(OciTagSource::new(CredentialSource::GoogleDefault))
    }
}

impl<S: TagSource> GcpBackend<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            enricher: TagEnricher::default(),
        }
    }
}

#[async_trait]
impl<S: TagSource> RegistryBackend for GcpBackend<S> {
    fn name(&self) -> &str {
        "GCP (GCR/Artifact Registry)"
    }

    fn supports(&self, reference: &str) -> bool {
        match ImageRef::parse(reference) {
            Ok(image) => {
                let host = image.registry_host();
                host.contains("gcr.io") || host.contains("pkg.dev")
            }
            Err(_) => false,
        }
    }

    async fn list_tags_with_time(&self, reference: &str) -> Result<Vec<TagRecord>, RegistryError> {
        list_and_enrich(&self.source, &self.enricher, reference).await
    }
}
