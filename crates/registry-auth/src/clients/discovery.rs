//! OIDC provider-metadata discovery.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{AuthError, AuthResult};

/// Request timeout for discovery fetches.
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// The slice of the discovery document the verifier needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    /// Issuer identifier as published by the provider.
    pub issuer: String,

    /// Authorization endpoint for the code flow.
    pub authorization_endpoint: String,

    /// Token endpoint for the code exchange.
    pub token_endpoint: String,

    /// Where the provider publishes its signing keys.
    pub jwks_uri: String,
}

/// Provider-metadata discovery capability.
#[async_trait]
pub trait ProviderDiscovery: Send + Sync {
    /// Resolve an issuer to its published metadata.
    async fn discover(&self, issuer: &str) -> AuthResult<ProviderMetadata>;
}

/// HTTPS discovery client using the standard well-known location.
#[derive(Clone)]
pub struct HttpProviderDiscovery {
    client: reqwest::Client,
}

impl HttpProviderDiscovery {
    /// Create a discovery client with the default timeout.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(DISCOVERY_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

impl Default for HttpProviderDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderDiscovery for HttpProviderDiscovery {
    #[instrument(skip(self))]
    async fn discover(&self, issuer: &str) -> AuthResult<ProviderMetadata> {
        debug!("Fetching OIDC discovery document");

        let url = format!(
            "{}/.well-known/openid-configuration",
            issuer.trim_end_matches('/')
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AuthError::Upstream(format!("Provider discovery failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::Upstream(format!(
                "Provider discovery returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Upstream(format!("Malformed discovery document: {}", e)))
    }
}
