//! Generic OIDC verifier for a configurable provider.
//!
//! Two entry modes share one validation path: callers that already hold a
//! provider ID token exchange it directly, and interactive callers run the
//! full authorization-code flow through the provider's endpoints. Unlike
//! the identity-derived verifiers, permissions here come entirely from
//! administrator configuration -- whoever passes the provider's checks and
//! the configured claim constraints receives the configured grants.

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use std::sync::Arc;

use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken, ExtraTokenFields,
    RedirectUrl, Scope, StandardRevocableToken, StandardTokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};

use registry_permissions::{Action, Permission};

use crate::claims::{AuthMethod, VerifiedCredentials};
use crate::clients::{KeySetFetcher, ProviderDiscovery, ProviderMetadata};
use crate::error::{AuthError, AuthResult};
use crate::session::{AuthSession, SessionStore};

/// A required name/value pair in the validated ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimConstraint {
    /// Claim name.
    pub name: String,

    /// Exact string value the claim must carry.
    pub value: String,
}

impl ClaimConstraint {
    /// Create a constraint.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Configuration for the generic OIDC verifier.
#[derive(Debug, Clone)]
pub struct OidcConfig {
    /// Provider issuer URL, used for discovery and `iss` validation.
    pub issuer: String,

    /// OAuth client id; also the required token audience.
    pub client_id: String,

    /// OAuth client secret, when the provider requires one.
    pub client_secret: Option<String>,

    /// Redirect URI for the authorization-code flow.
    pub redirect_uri: String,

    /// Extra claim constraints; all must match or the exchange fails.
    pub extra_claims: Vec<ClaimConstraint>,

    /// Comma-separated resource patterns granted `publish`.
    pub publish_patterns: String,

    /// Comma-separated resource patterns granted `edit`.
    pub edit_patterns: String,
}

impl OidcConfig {
    /// The permission set every successful exchange receives.
    ///
    /// Patterns are configuration, not identity: each entry becomes a
    /// permission regardless of the token subject.
    pub fn configured_permissions(&self) -> Vec<Permission> {
        let mut permissions = Vec::new();
        collect_patterns(&self.publish_patterns, Action::Publish, &mut permissions);
        collect_patterns(&self.edit_patterns, Action::Edit, &mut permissions);
        permissions
    }
}

fn collect_patterns(patterns: &str, action: Action, out: &mut Vec<Permission>) {
    out.extend(
        patterns
            .split(',')
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| Permission::new(action, pattern)),
    );
}

/// A started authorization-code flow.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// URL to send the user to.
    pub url: String,

    /// Opaque state the callback must return.
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdTokenFields {
    id_token: String,
}

impl ExtraTokenFields for IdTokenFields {}

type CodeFlowClient = Client<
    BasicErrorResponse,
    StandardTokenResponse<IdTokenFields, BasicTokenType>,
    BasicTokenType,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
>;

/// Verifier for a configurable OIDC provider.
pub struct OidcVerifier {
    config: OidcConfig,
    discovery: Arc<dyn ProviderDiscovery>,
    key_sets: Arc<dyn KeySetFetcher>,
    sessions: SessionStore,
}

impl OidcVerifier {
    /// Create a verifier over the given discovery and key-set clients.
    pub fn new(
        config: OidcConfig,
        discovery: Arc<dyn ProviderDiscovery>,
        key_sets: Arc<dyn KeySetFetcher>,
    ) -> Self {
        Self {
            config,
            discovery,
            key_sets,
            sessions: SessionStore::new(),
        }
    }

    /// Start an authorization-code flow.
    ///
    /// Issues fresh random `state` and `nonce` values, records the pending
    /// session, and returns the provider authorization URL.
    pub async fn start_authorization(&self) -> AuthResult<AuthorizationRequest> {
        let metadata = self.discovery.discover(&self.config.issuer).await?;
        let client = self.oauth_client(&metadata)?;

        let session = AuthSession::new(&self.config.redirect_uri);
        let state = session.state.clone();
        let csrf_state = state.clone();
        let (url, _) = client
            .authorize_url(move || CsrfToken::new(csrf_state))
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_extra_param("nonce", session.nonce.clone())
            .url();

        self.sessions.insert(session);
        Ok(AuthorizationRequest {
            url: url.to_string(),
            state,
        })
    }

    /// Complete an authorization-code flow.
    ///
    /// The session is consumed before anything else happens: a replayed,
    /// expired, or never-issued state fails without touching the provider.
    pub async fn exchange_code(&self, state: &str, code: &str) -> AuthResult<VerifiedCredentials> {
        let session = self.sessions.take(state).ok_or_else(|| {
            AuthError::ProofRejected(
                "Unknown, expired, or already used authorization session".to_string(),
            )
        })?;

        let metadata = self.discovery.discover(&self.config.issuer).await?;
        let client = self.oauth_client(&metadata)?;
        let response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::Upstream(format!("Code exchange failed: {}", e)))?;

        let id_token = response.extra_fields().id_token.clone();
        self.verify_id_token(&id_token, Some(&session.nonce)).await
    }

    /// Validate a provider ID token directly.
    ///
    /// Used both by the direct-exchange mode (no nonce expectation) and as
    /// the tail of the code flow (session nonce required). The subject is
    /// the `email` claim when present, the `sub` claim otherwise.
    pub async fn verify_id_token(
        &self,
        id_token: &str,
        expected_nonce: Option<&str>,
    ) -> AuthResult<VerifiedCredentials> {
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

        let metadata = self.discovery.discover(&self.config.issuer).await?;
        let key_set = self.key_sets.fetch_key_set(&metadata.jwks_uri).await?;
        let key = key_set.find(&kid).ok_or_else(|| {
            AuthError::ProofRejected("No matching key in the provider key set".to_string())
        })?;
        let decoding_key = key.rsa_decoding_key()?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.client_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let token_data = decode::<serde_json::Value>(id_token, &decoding_key, &validation)
            .map_err(|e| AuthError::ProofRejected(format!("ID token validation failed: {}", e)))?;
        let claims = token_data.claims;

        if let Some(expected) = expected_nonce {
            let nonce = claims.get("nonce").and_then(|value| value.as_str());
            if nonce != Some(expected) {
                return Err(AuthError::ProofRejected(
                    "ID token nonce does not match the session".to_string(),
                ));
            }
        }

        for constraint in &self.config.extra_claims {
            let value = claims.get(&constraint.name).and_then(|value| value.as_str());
            if value != Some(constraint.value.as_str()) {
                return Err(AuthError::ProofRejected(format!(
                    "Claim constraint not satisfied: {}",
                    constraint.name
                )));
            }
        }

        let subject = claims
            .get("email")
            .and_then(|value| value.as_str())
            .or_else(|| claims.get("sub").and_then(|value| value.as_str()))
            .ok_or_else(|| {
                AuthError::ProofRejected("ID token carries no subject".to_string())
            })?
            .to_string();

        Ok(VerifiedCredentials::new(
            AuthMethod::Oidc,
            subject,
            self.config.configured_permissions(),
        ))
    }

    fn oauth_client(&self, metadata: &ProviderMetadata) -> AuthResult<CodeFlowClient> {
        let auth_url = AuthUrl::new(metadata.authorization_endpoint.clone())
            .map_err(|e| AuthError::ConfigError(format!("Invalid authorization endpoint: {}", e)))?;
        let token_url = TokenUrl::new(metadata.token_endpoint.clone())
            .map_err(|e| AuthError::ConfigError(format!("Invalid token endpoint: {}", e)))?;
        let redirect_url = RedirectUrl::new(self.config.redirect_uri.clone())
            .map_err(|e| AuthError::ConfigError(format!("Invalid redirect URI: {}", e)))?;

        Ok(CodeFlowClient::new(
            ClientId::new(self.config.client_id.clone()),
            self.config.client_secret.clone().map(ClientSecret::new),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::clients::KeySet;

    struct StaticDiscovery;

    #[async_trait]
    impl ProviderDiscovery for StaticDiscovery {
        async fn discover(&self, issuer: &str) -> AuthResult<ProviderMetadata> {
            Ok(ProviderMetadata {
                issuer: issuer.to_string(),
                authorization_endpoint: format!("{}/authorize", issuer),
                token_endpoint: format!("{}/token", issuer),
                jwks_uri: format!("{}/jwks", issuer),
            })
        }
    }

    struct EmptyKeySet;

    #[async_trait]
    impl KeySetFetcher for EmptyKeySet {
        async fn fetch_key_set(&self, _url: &str) -> AuthResult<KeySet> {
            Ok(KeySet::default())
        }
    }

    fn config() -> OidcConfig {
        OidcConfig {
            issuer: "https://issuer.example".to_string(),
            client_id: "registry-client".to_string(),
            client_secret: None,
            redirect_uri: "https://registry.example/callback".to_string(),
            extra_claims: vec![],
            publish_patterns: "com.example/*, com.example.tools/*".to_string(),
            edit_patterns: "com.example/*".to_string(),
        }
    }

    fn verifier(config: OidcConfig) -> OidcVerifier {
        OidcVerifier::new(config, Arc::new(StaticDiscovery), Arc::new(EmptyKeySet))
    }

    #[test]
    fn test_configured_permissions_parse_comma_lists() {
        let permissions = config().configured_permissions();
        assert_eq!(
            permissions,
            vec![
                Permission::publish("com.example/*"),
                Permission::publish("com.example.tools/*"),
                Permission::edit("com.example/*"),
            ]
        );
    }

    #[test]
    fn test_empty_pattern_entries_are_skipped() {
        let mut cfg = config();
        cfg.publish_patterns = " , com.example/* ,, ".to_string();
        cfg.edit_patterns = String::new();
        assert_eq!(
            cfg.configured_permissions(),
            vec![Permission::publish("com.example/*")]
        );
    }

    #[tokio::test]
    async fn test_start_authorization_records_session() {
        let verifier = verifier(config());
        let request = verifier.start_authorization().await.unwrap();

        assert!(request.url.starts_with("https://issuer.example/authorize"));
        assert!(request.url.contains(&format!("state={}", request.state)));
        assert!(request.url.contains("nonce="));
        assert!(request.url.contains("scope=openid+email"));
        assert_eq!(verifier.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_exchange_with_unknown_state_fails_before_provider() {
        let verifier = verifier(config());
        let err = verifier.exchange_code("never-issued", "code").await.unwrap_err();
        assert!(matches!(err, AuthError::ProofRejected(_)));
    }

    #[tokio::test]
    async fn test_non_rs256_id_token_rejected() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let token = format!("{}.{}.{}", header, URL_SAFE_NO_PAD.encode("{}"), "sig");

        let err = verifier(config())
            .verify_id_token(&token, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ProofRejected(_)));
    }

    #[tokio::test]
    async fn test_missing_kid_rejected() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let token = format!("{}.{}.{}", header, URL_SAFE_NO_PAD.encode("{}"), "sig");

        let err = verifier(config())
            .verify_id_token(&token, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ProofRejected(_)));
    }
}
