//! DNS domain-ownership verifier.
//!
//! The publisher signs the current RFC3339 timestamp with a key whose
//! public half is published in a TXT record on the domain. Control of the
//! DNS zone implies authority over subdomains, so a successful proof
//! grants the reverse-label namespace and its subtree.

use std::sync::Arc;

use registry_permissions::Permission;

use crate::claims::{AuthMethod, VerifiedCredentials};
use crate::clients::{Clock, DnsResolver};
use crate::error::{AuthError, AuthResult};
use crate::verifiers::domain;

/// Verifier for DNS TXT domain-ownership proofs.
pub struct DnsVerifier {
    resolver: Arc<dyn DnsResolver>,
    clock: Arc<dyn Clock>,
}

impl DnsVerifier {
    /// Create a verifier over the given resolver and clock.
    pub fn new(resolver: Arc<dyn DnsResolver>, clock: Arc<dyn Clock>) -> Self {
        Self { resolver, clock }
    }

    /// Verify a domain-ownership proof.
    ///
    /// # Arguments
    ///
    /// * `domain` - The domain whose namespace is being claimed
    /// * `timestamp` - RFC3339 timestamp the signature covers, within
    ///   ±15 seconds of now
    /// * `signature_hex` - Hex-encoded detached Ed25519 signature over the
    ///   exact timestamp bytes
    ///
    /// Syntax and window checks run before the TXT lookup. Every published
    /// record carrying the key marker is a candidate; the proof is
    /// accepted if any candidate key verifies the signature, so a domain
    /// can rotate keys by publishing old and new side by side.
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

        let records = self.resolver.txt_records(&domain).await?;
        let keys = domain::candidate_keys(records.iter().map(String::as_str));
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
        let permissions = vec![
            Permission::publish(format!("{}/*", namespace)),
            Permission::publish(format!("{}.*", namespace)),
        ];
        Ok(VerifiedCredentials::new(AuthMethod::Dns, domain, permissions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
    use base64::Engine;
    use chrono::{Duration, Utc};
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;

    use crate::clients::FixedClock;

    struct StaticResolver(AuthResult<Vec<String>>);

    #[async_trait]
    impl DnsResolver for StaticResolver {
        async fn txt_records(&self, _domain: &str) -> AuthResult<Vec<String>> {
            match &self.0 {
                Ok(records) => Ok(records.clone()),
                Err(_) => Err(AuthError::Upstream("DNS TXT lookup failed".to_string())),
            }
        }
    }

    fn proof_record(key: &SigningKey) -> String {
        format!(
            "v=MCPv1; k=ed25519; p={}",
            BASE64_STANDARD.encode(key.verifying_key().to_bytes())
        )
    }

    fn verifier_with(records: Vec<String>, now: chrono::DateTime<Utc>) -> DnsVerifier {
        DnsVerifier::new(
            Arc::new(StaticResolver(Ok(records))),
            Arc::new(FixedClock(now)),
        )
    }

    fn signed_timestamp(key: &SigningKey, now: chrono::DateTime<Utc>) -> (String, String) {
        let timestamp = now.to_rfc3339();
        let signature = hex::encode(key.sign(timestamp.as_bytes()).to_bytes());
        (timestamp, signature)
    }

    #[tokio::test]
    async fn test_valid_proof_grants_namespace_and_subtree() {
        let key = SigningKey::generate(&mut OsRng);
        let now = Utc::now();
        let verifier = verifier_with(vec![proof_record(&key)], now);
        let (timestamp, signature) = signed_timestamp(&key, now);

        let credentials = verifier
            .verify("example.com", &timestamp, &signature)
            .await
            .unwrap();

        assert_eq!(credentials.auth_method, AuthMethod::Dns);
        assert_eq!(credentials.subject, "example.com");
        assert_eq!(
            credentials.permissions,
            vec![
                Permission::publish("com.example/*"),
                Permission::publish("com.example.*"),
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_record_alongside_valid_still_verifies() {
        let key = SigningKey::generate(&mut OsRng);
        let now = Utc::now();
        let verifier = verifier_with(
            vec![
                "v=MCPv1; k=ed25519; p=!!not-base64!!".to_string(),
                proof_record(&key),
            ],
            now,
        );
        let (timestamp, signature) = signed_timestamp(&key, now);

        assert!(verifier
            .verify("example.com", &timestamp, &signature)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_rotated_keys_any_match_accepts() {
        let old_key = SigningKey::generate(&mut OsRng);
        let new_key = SigningKey::generate(&mut OsRng);
        let now = Utc::now();
        let verifier = verifier_with(vec![proof_record(&old_key), proof_record(&new_key)], now);
        let (timestamp, signature) = signed_timestamp(&new_key, now);

        assert!(verifier
            .verify("example.com", &timestamp, &signature)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_no_candidate_keys_rejected() {
        let key = SigningKey::generate(&mut OsRng);
        let now = Utc::now();
        let verifier = verifier_with(vec!["spf1 include:example".to_string()], now);
        let (timestamp, signature) = signed_timestamp(&key, now);

        let err = verifier
            .verify("example.com", &timestamp, &signature)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ProofRejected(_)));
    }

    #[tokio::test]
    async fn test_wrong_key_rejected() {
        let published = SigningKey::generate(&mut OsRng);
        let signer = SigningKey::generate(&mut OsRng);
        let now = Utc::now();
        let verifier = verifier_with(vec![proof_record(&published)], now);
        let (timestamp, signature) = signed_timestamp(&signer, now);

        let err = verifier
            .verify("example.com", &timestamp, &signature)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ProofRejected(_)));
    }

    #[tokio::test]
    async fn test_timestamp_window_boundary() {
        let key = SigningKey::generate(&mut OsRng);
        let proof_time = Utc::now();
        let (timestamp, signature) = signed_timestamp(&key, proof_time);

        let at_edge = verifier_with(
            vec![proof_record(&key)],
            proof_time + Duration::milliseconds(15_000),
        );
        assert!(at_edge
            .verify("example.com", &timestamp, &signature)
            .await
            .is_ok());

        let past_edge = verifier_with(
            vec![proof_record(&key)],
            proof_time + Duration::milliseconds(15_001),
        );
        let err = past_edge
            .verify("example.com", &timestamp, &signature)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ProofRejected(_)));
    }

    #[tokio::test]
    async fn test_malformed_inputs_rejected_before_lookup() {
        struct PanickingResolver;

        #[async_trait]
        impl DnsResolver for PanickingResolver {
            async fn txt_records(&self, _domain: &str) -> AuthResult<Vec<String>> {
                panic!("lookup must not run for malformed input");
            }
        }

        let verifier = DnsVerifier::new(
            Arc::new(PanickingResolver),
            Arc::new(FixedClock(Utc::now())),
        );
        let good_sig = "ab".repeat(64);

        assert!(matches!(
            verifier.verify("not a domain", "2026-08-06T12:00:00Z", &good_sig).await,
            Err(AuthError::MalformedInput(_))
        ));
        assert!(matches!(
            verifier.verify("example.com", "yesterday", &good_sig).await,
            Err(AuthError::MalformedInput(_))
        ));
        assert!(matches!(
            verifier
                .verify("example.com", &Utc::now().to_rfc3339(), "zz")
                .await,
            Err(AuthError::MalformedInput(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_failure_surfaces_as_upstream() {
        let key = SigningKey::generate(&mut OsRng);
        let now = Utc::now();
        let verifier = DnsVerifier::new(
            Arc::new(StaticResolver(Err(AuthError::Upstream(String::new())))),
            Arc::new(FixedClock(now)),
        );
        let (timestamp, signature) = signed_timestamp(&key, now);

        let err = verifier
            .verify("example.com", &timestamp, &signature)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_domain_is_lowercased_for_lookup_and_subject() {
        let key = SigningKey::generate(&mut OsRng);
        let now = Utc::now();
        let verifier = verifier_with(vec![proof_record(&key)], now);
        let (timestamp, signature) = signed_timestamp(&key, now);

        let credentials = verifier
            .verify("Example.COM", &timestamp, &signature)
            .await
            .unwrap();
        assert_eq!(credentials.subject, "example.com");
    }
}
