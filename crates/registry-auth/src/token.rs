//! Registry token issuance and validation
//!
//! Tokens are compact EdDSA-signed JWTs. The service holds pre-built
//! encoding and decoding keys derived once from an Ed25519 signing key;
//! issuance and validation are pure CPU work with no shared mutable state.
//!
//! The deny-list check strictly precedes signing, and expiry/not-before
//! checks strictly precede trusting any claim on the way back in.

use chrono::{DateTime, Duration, Utc};
use ed25519_dalek::pkcs8::EncodePrivateKey;
use ed25519_dalek::SigningKey;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use registry_permissions::DenyList;
use serde::{Deserialize, Serialize};

use crate::claims::{RegistryClaims, VerifiedCredentials};
use crate::error::{AuthError, AuthResult};

/// Token service configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Token issuer.
    pub issuer: String,

    /// Lifetime of issued tokens.
    pub token_lifetime: Duration,

    /// Validation leeway in seconds for `exp`/`nbf` clock skew.
    pub leeway_secs: u64,

    /// Namespace roots barred from non-global grants.
    pub denylist: DenyList,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: "registry".to_string(),
            token_lifetime: Duration::hours(1),
            leeway_secs: 0,
            denylist: DenyList::empty(),
        }
    }
}

/// A freshly issued token and its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Encoded signed token.
    pub token: String,

    /// Expiration time of the token.
    pub expires_at: DateTime<Utc>,
}

/// Token service for issuing and validating registry tokens.
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl TokenService {
    /// Create a new token service from an Ed25519 signing key.
    ///
    /// # Arguments
    ///
    /// * `signing_key` - The registry's Ed25519 signing key
    /// * `config` - Issuer, lifetime, and deny-list configuration
    pub fn new(signing_key: &SigningKey, config: TokenConfig) -> AuthResult<Self> {
        let der = signing_key
            .to_pkcs8_der()
            .map_err(|e| AuthError::ConfigError(format!("Invalid Ed25519 signing key: {}", e)))?;
        let encoding_key = EncodingKey::from_ed_der(der.as_bytes());
        let decoding_key = DecodingKey::from_ed_der(signing_key.verifying_key().as_bytes());

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    /// Create from a raw 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32], config: TokenConfig) -> AuthResult<Self> {
        Self::new(&SigningKey::from_bytes(seed), config)
    }

    /// Get the configuration.
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issue a signed token for verified credentials.
    ///
    /// The permission set is checked against the deny-list first; a blocked
    /// namespace fails the whole issuance and nothing is signed. A global
    /// `"*"` grant in the set bypasses the deny-list.
    ///
    /// # Returns
    ///
    /// The encoded token and its expiry, or `PolicyDenied`.
    pub fn issue(&self, credentials: VerifiedCredentials) -> AuthResult<IssuedToken> {
        if let Err(root) = self.config.denylist.check(&credentials.permissions) {
            return Err(AuthError::PolicyDenied(root.to_string()));
        }

        let claims = RegistryClaims::new(
            credentials,
            self.config.issuer.clone(),
            Utc::now(),
            self.config.token_lifetime,
        );
        let token = self.encode(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Encode claims into a signed token.
    ///
    /// Low-level entry point; `issue` is the policy-checked path.
    pub fn encode(&self, claims: &RegistryClaims) -> AuthResult<String> {
        let header = Header::new(Algorithm::EdDSA);
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Validate and decode a token.
    ///
    /// Signature, expiry, not-before, and issuer are all enforced before
    /// any claim is returned.
    pub fn validate(&self, token: &str) -> AuthResult<RegistryClaims> {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss"]);
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = self.config.leeway_secs;

        let token_data = decode::<RegistryClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::BadSignature,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AuthError::TokenMalformed("Invalid issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                    AuthError::TokenMalformed("Invalid algorithm".to_string())
                }
                _ => AuthError::TokenMalformed(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}
