//! HTTPS well-known proof fetcher.
//!
//! Fetches the domain-ownership proof document from a fixed path over the
//! domain's secure endpoint. Redirects are never followed and the response
//! is size-capped: the fetched URL is attacker-influenced, so a redirect
//! chain or an unbounded body must not be able to reach anywhere else or
//! exhaust memory.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{AuthError, AuthResult};

/// Fixed path the proof document is served from.
pub const WELL_KNOWN_PROOF_PATH: &str = "/.well-known/mcp-registry-auth";

/// Request timeout for proof fetches.
const PROOF_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum accepted proof document size.
const MAX_PROOF_BYTES: usize = 4096;

/// Proof-document fetch capability: domain to small text body.
#[async_trait]
pub trait ProofFetcher: Send + Sync {
    /// Fetch the proof document published by `domain`.
    async fn fetch_proof(&self, domain: &str) -> AuthResult<String>;
}

/// HTTPS fetcher for the well-known proof path.
#[derive(Clone)]
pub struct WellKnownFetcher {
    client: reqwest::Client,
}

impl WellKnownFetcher {
    /// Create a fetcher with redirects disabled and the default timeout.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROOF_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

impl Default for WellKnownFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProofFetcher for WellKnownFetcher {
    #[instrument(skip(self))]
    async fn fetch_proof(&self, domain: &str) -> AuthResult<String> {
        debug!("Fetching well-known proof document");

        let url = format!("https://{}{}", domain, WELL_KNOWN_PROOF_PATH);
        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AuthError::Upstream(format!("Proof fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::Upstream(format!(
                "Proof fetch returned status {}",
                response.status()
            )));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AuthError::Upstream(format!("Proof fetch failed: {}", e)))?
        {
            if body.len() + chunk.len() > MAX_PROOF_BYTES {
                return Err(AuthError::Upstream(
                    "Proof document exceeds the size cap".to_string(),
                ));
            }
            body.extend_from_slice(&chunk);
        }

        String::from_utf8(body)
            .map_err(|_| AuthError::Upstream("Proof document is not valid UTF-8".to_string()))
    }
}
