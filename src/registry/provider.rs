// ABOUTME: Ordered collection of registry backends with first-match dispatch.
// ABOUTME: Specific domain matchers are registered before the catch-all backend.

use super::{EcrBackend, GcpBackend, GenericBackend, RegistryBackend, RegistryError, TagRecord};

/// Dispatches an image reference to the first backend that supports it.
///
/// Holds no per-call state, so one registry can serve any number of
/// sequential lookups.
#[derive(Default)]
pub struct ProviderRegistry {
    backends: Vec<Box<dyn RegistryBackend>>,
}

impl ProviderRegistry {
    /// An empty registry. Backends are tried in registration order.
    pub fn new() -> Self {
        Self::default()
    }

    /// ECR, then GCP, then the generic catch-all.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(EcrBackend::aws());
        registry.register(GcpBackend::oci());
        registry.register(GenericBackend::oci());
        registry
    }

    /// Append a backend. It only sees references no earlier backend claims.
    pub fn register<B: RegistryBackend + 'static>(&mut self, backend: B) {
        self.backends.push(Box::new(backend));
    }

    /// The backend that handles `reference`, if any.
    pub fn resolve(&self, reference: &str) -> Option<&dyn RegistryBackend> {
        let backend = self
            .backends
            .iter()
            .find(|backend| backend.supports(reference))
            .map(|backend| backend.as_ref());

        match backend {
            Some(b) => tracing::debug!(reference, backend = b.name(), "resolved registry backend"),
            None => tracing::debug!(reference, "no registry backend matched"),
        }
        backend
    }

    /// Display names of all registered backends.
    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    fn resolve_or_err(&self, reference: &str) -> Result<&dyn RegistryBackend, RegistryError> {
        self.resolve(reference).ok_or_else(|| RegistryError::NoBackend {
            reference: reference.to_string(),
            available: self.names().into_iter().map(str::to_string).collect(),
        })
    }

    /// Tag names for `reference`, newest first.
    pub async fn list_tags(&self, reference: &str) -> Result<Vec<String>, RegistryError> {
        self.resolve_or_err(reference)?.list_tags(reference).await
    }

    /// Tags with creation times for `reference`, newest first.
    pub async fn list_tags_with_time(
        &self,
        reference: &str,
    ) -> Result<Vec<TagRecord>, RegistryError> {
        self.resolve_or_err(reference)?
            .list_tags_with_time(reference)
            .await
    }
}
