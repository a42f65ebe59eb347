// ABOUTME: Catch-all backend for Docker Hub style references.
// ABOUTME: Must be registered last since it claims bare and one-level names.

use async_trait::async_trait;

use super::{
    CredentialSource, OciTagSource, RegistryBackend, RegistryError, TagEnricher, TagRecord,
    TagSource, list_and_enrich,
};
use crate::types::{DEFAULT_REGISTRY, ImageRef};

/// Backend for Docker Hub and Docker-compatible references without a
/// dotted host.
pub struct GenericBackend<S> {
    source: S,
    enricher: TagEnricher,
}

impl GenericBackend<OciTagSource> {
    /// Authenticates through the Docker credential chain.
    pub fn oci() -> Self {
        Self::new(OciTagSource::new(CredentialSource::DockerConfig))
    }
}

impl<S: TagSource> GenericBackend<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            enricher: TagEnricher::default(),
        }
    }
}

#[async_trait]
impl<S: TagSource> RegistryBackend for GenericBackend<S> {
    fn name(&self) -> &str {
        "Docker Hub"
    }

    fn supports(&self, reference: &str) -> bool {
        let Ok(image) = ImageRef::parse(reference) else {
            return false;
        };

        let host = image.registry_host();
        host == DEFAULT_REGISTRY
            || host == "docker.io"
            || !reference.contains('/')
            || (reference.matches('/').count() == 1 && !reference.contains('.'))
    }

    async fn list_tags_with_time(&self, reference: &str) -> Result<Vec<TagRecord>, RegistryError> {
        list_and_enrich(&self.source, &self.enricher, reference).await
    }
}
