//! Remote JSON Web Key sets.
//!
//! OIDC providers publish their current signing keys as a JSON document;
//! the verifiers fetch it per validation and rebuild the RSA public key
//! from the modulus/exponent fields of the matching entry. No key set is
//! cached here -- a caching fetcher is a policy decision for the caller,
//! not something this layer adds silently.

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{AuthError, AuthResult};

/// Request timeout for key-set fetches.
const KEY_SET_TIMEOUT: Duration = Duration::from_secs(10);

/// One published signing key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key id the token header points at.
    #[serde(default)]
    pub kid: Option<String>,

    /// Key type (`RSA` for the providers handled here).
    pub kty: String,

    /// Declared algorithm, if any.
    #[serde(default)]
    pub alg: Option<String>,

    /// RSA modulus, base64url.
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent, base64url.
    #[serde(default)]
    pub e: Option<String>,
}

impl JsonWebKey {
    /// Rebuild an RSA decoding key from the modulus/exponent fields.
    pub fn rsa_decoding_key(&self) -> AuthResult<DecodingKey> {
        if self.kty != "RSA" {
            return Err(AuthError::ProofRejected(format!(
                "Unsupported key type '{}'",
                self.kty
            )));
        }
        let (n, e) = match (&self.n, &self.e) {
            (Some(n), Some(e)) => (n, e),
            _ => {
                return Err(AuthError::ProofRejected(
                    "Provider key is missing modulus or exponent".to_string(),
                ))
            }
        };
        DecodingKey::from_rsa_components(n, e)
            .map_err(|e| AuthError::ProofRejected(format!("Provider key is invalid: {}", e)))
    }
}

/// A provider's current key set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeySet {
    /// Published keys.
    pub keys: Vec<JsonWebKey>,
}

impl KeySet {
    /// Find the key with the given id.
    pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys
            .iter()
            .find(|key| key.kid.as_deref() == Some(kid))
    }
}

/// Remote key-set fetch capability.
#[async_trait]
pub trait KeySetFetcher: Send + Sync {
    /// Fetch the key set published at `url`.
    async fn fetch_key_set(&self, url: &str) -> AuthResult<KeySet>;
}

/// HTTPS key-set fetcher.
#[derive(Clone)]
pub struct HttpKeySetFetcher {
    client: reqwest::Client,
}

impl HttpKeySetFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(KEY_SET_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

impl Default for HttpKeySetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeySetFetcher for HttpKeySetFetcher {
    #[instrument(skip(self))]
    async fn fetch_key_set(&self, url: &str) -> AuthResult<KeySet> {
        debug!("Fetching provider key set");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::Upstream(format!("Key set fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::Upstream(format!(
                "Key set fetch returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Upstream(format!("Malformed key set response: {}", e)))
    }
}
