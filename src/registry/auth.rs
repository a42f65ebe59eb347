// ABOUTME: Credential selection for OCI registry access.
// ABOUTME: Google application-default credentials or the Docker credential chain.

use oci_client::secrets::RegistryAuth;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Where a backend gets registry credentials from.
///
/// Every source degrades to anonymous access when no credentials exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Never send credentials.
    Anonymous,
    /// Docker credential helpers and `~/.docker/config.json`.
    DockerConfig,
    /// Google application-default credentials (GCR, Artifact Registry).
    GoogleDefault,
}

impl CredentialSource {
    /// Resolve credentials for `registry` (a host such as `gcr.io`).
    pub async fn resolve(self, registry: &str) -> RegistryAuth {
        match self {
            CredentialSource::Anonymous => RegistryAuth::Anonymous,
            CredentialSource::DockerConfig => docker_config_auth(registry).await,
            CredentialSource::GoogleDefault => google_default_auth(registry).await,
        }
    }
}

async fn google_default_auth(registry: &str) -> RegistryAuth {
    let provider = match gcp_auth::provider().await {
        Ok(provider) => provider,
        Err(e) => {
            tracing::debug!(registry, "no application default credentials: {}", e);
            return RegistryAuth::Anonymous;
        }
    };

    match provider.token(&[CLOUD_PLATFORM_SCOPE]).await {
        Ok(token) => {
            RegistryAuth::Basic("oauth2accesstoken".to_string(), token.as_str().to_string())
        }
        Err(e) => {
            tracing::debug!(registry, "failed to obtain access token: {}", e);
            RegistryAuth::Anonymous
        }
    }
}

async fn docker_config_auth(registry: &str) -> RegistryAuth {
    let server = registry.to_string();
    // Credential helpers are external processes.
    let lookup =
        tokio::task::spawn_blocking(move || docker_credential::get_credential(&server)).await;

    match lookup {
        Ok(Ok(docker_credential::DockerCredential::UsernamePassword(user, password))) => {
            RegistryAuth::Basic(user, password)
        }
        Ok(Ok(docker_credential::DockerCredential::IdentityToken(_))) => {
            tracing::warn!(
                registry,
                "identity tokens are not supported, using anonymous access"
            );
            RegistryAuth::Anonymous
        }
        Ok(Err(e)) => {
            tracing::debug!(registry, "no docker credentials: {}", e);
            RegistryAuth::Anonymous
        }
        Err(e) => {
            tracing::warn!(registry, "credential lookup task failed: {}", e);
            RegistryAuth::Anonymous
        }
    }
}
