//! HTTP domain-ownership verifier.
//!
//! Same detached-signature proof as the DNS verifier, but the key marker
//! is served from the domain's well-known path instead of a TXT record.
//! Hosting a file proves control of one web endpoint, not of the DNS
//! zone, so the grant covers only the domain's own namespace -- no
//! subtree.

use std::sync::Arc;

use registry_permissions::Permission;

use crate::claims::{AuthMethod, VerifiedCredentials};
use crate::clients::{Clock, ProofFetcher};
use crate::error::{AuthError, AuthResult};
use crate::verifiers::domain;

/// Verifier for HTTPS well-known domain-ownership proofs.
pub struct HttpVerifier {
    fetcher: Arc<dyn ProofFetcher>,
    clock: Arc<dyn Clock>,
}

impl HttpVerifier {
    /// Create a verifier over the given proof fetcher and clock.
    pub fn new(fetcher: Arc<dyn ProofFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self { fetcher, clock }
    }

    /// Verify a domain-ownership proof.
    ///
    /// Validation order matches the DNS verifier: domain syntax, timestamp
    /// parse, signature decode, and window check all run before the fetch.
    /// Every non-empty line of the proof document is a candidate record.
    pub async fn verify(
        &self,
        domain: &str,
        timestamp: &str,
        signature_hex: &str,
    ) -> AuthResult<VerifiedCredentials> {
        let domain = domain.to_ascii_lowercase();
        domain::validate_domain(&domain)?;
        let proof_time = domain::parse_timestamp(timestamp)?;
        let signature = domain::decode_signature(signature_hex)?;
        domain::check_window(proof_time, self.clock.now())?;

        let body = self.fetcher.fetch_proof(&domain).await?;
        let keys = domain::candidate_keys(
            body.lines().map(str::trim).filter(|line| !line.is_empty()),
        );
        if keys.is_empty() {
            return Err(AuthError::ProofRejected(
                "No registry verification keys published for the domain".to_string(),
            ));
        }
        if !domain::any_key_verifies(&keys, timestamp.as_bytes(), &signature) {
            return Err(AuthError::ProofRejected(
                "Signature does not verify against any published key".to_string(),
            ));
        }

        let namespace = domain::reverse_domain_labels(&domain);
        let permissions = vec![Permission::publish(format!("{}/*", namespace))];
        Ok(VerifiedCredentials::new(AuthMethod::Http, domain, permissions))
    }
}
