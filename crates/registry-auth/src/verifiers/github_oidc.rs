//! GitHub Actions workload-identity verifier.
//!
//! Accepts an OIDC ID token minted by GitHub's Actions identity provider
//! and scoped to this registry's audience. The grant is keyed on the
//! `repository_owner` claim rather than the individual repository,
//! mirroring the owner-level granularity of GitHub's own package-push
//! permissions.

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use std::sync::Arc;

use registry_permissions::Permission;

use crate::claims::{AuthMethod, VerifiedCredentials};
use crate::clients::KeySetFetcher;
use crate::error::{AuthError, AuthResult};
use crate::verifiers::github::{valid_github_name, GITHUB_NAMESPACE_PREFIX};

/// Issuer of GitHub Actions workload-identity tokens.
pub const GITHUB_ACTIONS_ISSUER: &str = "https://token.actions.githubusercontent.com";

/// Where GitHub publishes the corresponding signing keys.
pub const GITHUB_ACTIONS_JWKS_URL: &str =
    "https://token.actions.githubusercontent.com/.well-known/jwks";

/// Configuration for the workload-identity verifier.
#[derive(Debug, Clone)]
pub struct GitHubOidcConfig {
    /// Audience the ID token must be scoped to.
    pub audience: String,

    /// Expected issuer.
    pub issuer: String,

    /// Key-set URL.
    pub jwks_url: String,
}

impl GitHubOidcConfig {
    /// Configuration against the public GitHub Actions provider.
    pub fn new(audience: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            issuer: GITHUB_ACTIONS_ISSUER.to_string(),
            jwks_url: GITHUB_ACTIONS_JWKS_URL.to_string(),
        }
    }
}

/// Verifier for GitHub Actions OIDC ID tokens.
pub struct GitHubOidcVerifier {
    config: GitHubOidcConfig,
    key_sets: Arc<dyn KeySetFetcher>,
}

impl GitHubOidcVerifier {
    /// Create a verifier over the given key-set fetcher.
    pub fn new(config: GitHubOidcConfig, key_sets: Arc<dyn KeySetFetcher>) -> Self {
        Self { config, key_sets }
    }

    /// Verify a workload-identity ID token.
    ///
    /// The token header names the signing key; the provider's current key
    /// set is fetched and the matching RSA public key rebuilt from its
    /// modulus and exponent. Signature, issuer, audience, and a non-empty
    /// `repository_owner` claim are all required.
    pub async fn verify(&self, id_token: &str) -> AuthResult<VerifiedCredentials> {
        let header = decode_header(id_token)
            .map_err(|e| AuthError::MalformedInput(format!("Malformed ID token: {}", e)))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::ProofRejected(
                "Unsupported ID token algorithm".to_string(),
            ));
        }
        let kid = header.kid.ok_or_else(|| {
            AuthError::ProofRejected("ID token header carries no key id".to_string())
        })?;

        let key_set = self.key_sets.fetch_key_set(&self.config.jwks_url).await?;
        let key = key_set.find(&kid).ok_or_else(|| {
            AuthError::ProofRejected("No matching key in the provider key set".to_string())
        })?;
        let decoding_key = key.rsa_decoding_key()?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let token_data = decode::<serde_json::Value>(id_token, &decoding_key, &validation)
            .map_err(|e| AuthError::ProofRejected(format!("ID token validation failed: {}", e)))?;

        let owner = token_data
            .claims
            .get("repository_owner")
            .and_then(|value| value.as_str())
            .filter(|owner| !owner.is_empty())
            .ok_or_else(|| {
                AuthError::ProofRejected("ID token carries no repository owner".to_string())
            })?
            .to_string();

        let permissions = if valid_github_name(&owner) {
            vec![Permission::publish(format!(
                "{}.{}/*",
                GITHUB_NAMESPACE_PREFIX, owner
            ))]
        } else {
            Vec::new()
        };

        Ok(VerifiedCredentials::new(
            AuthMethod::GithubOidc,
            owner,
            permissions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    use crate::clients::KeySet;

    struct EmptyKeySet;

    #[async_trait]
    impl KeySetFetcher for EmptyKeySet {
        async fn fetch_key_set(&self, _url: &str) -> AuthResult<KeySet> {
            Ok(KeySet::default())
        }
    }

    fn verifier() -> GitHubOidcVerifier {
        GitHubOidcVerifier::new(GitHubOidcConfig::new("registry"), Arc::new(EmptyKeySet))
    }

    fn unsigned_token(header: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(header.to_string());
        let payload = URL_SAFE_NO_PAD.encode("{}");
        format!("{}.{}.{}", header, payload, URL_SAFE_NO_PAD.encode("sig"))
    }

    #[tokio::test]
    async fn test_garbage_token_is_malformed() {
        let err = verifier().verify("garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedInput(_)));
    }

    #[tokio::test]
    async fn test_non_rs256_rejected() {
        let token = unsigned_token(serde_json::json!({"alg": "HS256", "typ": "JWT"}));
        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::ProofRejected(_)));
    }

    #[tokio::test]
    async fn test_missing_kid_rejected() {
        let token = unsigned_token(serde_json::json!({"alg": "RS256", "typ": "JWT"}));
        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::ProofRejected(_)));
    }

    #[tokio::test]
    async fn test_unknown_kid_rejected() {
        let token =
            unsigned_token(serde_json::json!({"alg": "RS256", "typ": "JWT", "kid": "nope"}));
        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::ProofRejected(_)));
    }

    #[test]
    fn test_default_config_points_at_github() {
        let config = GitHubOidcConfig::new("registry");
        assert_eq!(config.issuer, GITHUB_ACTIONS_ISSUER);
        assert!(config.jwks_url.starts_with(GITHUB_ACTIONS_ISSUER));
    }
}
