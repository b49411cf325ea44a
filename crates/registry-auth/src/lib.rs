//! # Registry Authentication
//!
//! This crate provides the authentication-to-authorization pipeline for
//! the package registry: identity verifiers, Ed25519 token issuance and
//! validation, and the permission checks consumed by the publish and edit
//! APIs.
//!
//! ## Overview
//!
//! The registry-auth crate handles:
//! - **Verifiers**: Six proof-of-identity protocols (GitHub access token,
//!   GitHub Actions OIDC, generic OIDC, DNS and HTTPS domain ownership,
//!   anonymous), each normalizing into one credential shape
//! - **Tokens**: EdDSA-signed claims with registered temporal fields,
//!   validated statelessly
//! - **Policy**: Deny-list enforcement at issuance, wildcard permission
//!   matching at request time (re-exported from registry-permissions)
//! - **Sessions**: Single-use, five-minute authorization-flow sessions
//!
//! ## Features
//!
//! - `github` (default): GitHub access-token and workload-identity verifiers
//! - `oidc` (default): Generic OIDC verifier and authorization-code flow
//! - `domain` (default): DNS and HTTPS domain-ownership verifiers
//! - `anonymous` (default): The anonymous verifier
//! - `full`: All features enabled
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use registry_auth::clients::{GitHubApiClient, SystemClock};
//! use registry_auth::verifiers::github::GitHubAtVerifier;
//! use registry_auth::{Action, TokenConfig, TokenService, has_permission};
//!
//! # async fn exchange(access_token: &str) -> registry_auth::AuthResult<()> {
//! let signing_key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
//! let tokens = TokenService::new(&signing_key, TokenConfig::default())?;
//!
//! // Exchange method-specific credentials for a registry token.
//! let verifier = GitHubAtVerifier::new(Arc::new(GitHubApiClient::new()));
//! let credentials = verifier.verify(access_token).await?;
//! let issued = tokens.issue(credentials)?;
//!
//! // Authorize a write with the validated claims.
//! let claims = tokens.validate(&issued.token)?;
//! if has_permission("io.github.alice/server", Action::Publish, &claims.permissions) {
//!     // apply the write
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Trust boundaries
//!
//! The signed token is the only artifact that crosses the trust boundary;
//! nothing is persisted server-side and there is no revocation state. The
//! deny-list check strictly precedes signing, and expiry/not-before checks
//! strictly precede trusting any validated claim.

pub mod claims;
pub mod clients;
pub mod error;
pub mod session;
pub mod token;
pub mod verifiers;

// Re-export main types
pub use claims::{AuthMethod, RegistryClaims, VerifiedCredentials};
pub use error::{AuthError, AuthResult};
pub use session::{AuthSession, SessionStore};
pub use token::{IssuedToken, TokenConfig, TokenService};

// Re-export the permission model the claims are built from
pub use registry_permissions::{has_permission, Action, DenyList, Permission};

#[cfg(feature = "anonymous")]
pub use verifiers::anonymous::AnonymousVerifier;
#[cfg(feature = "domain")]
pub use verifiers::dns::DnsVerifier;
#[cfg(feature = "github")]
pub use verifiers::github::GitHubAtVerifier;
#[cfg(feature = "github")]
pub use verifiers::github_oidc::{GitHubOidcConfig, GitHubOidcVerifier};
#[cfg(feature = "domain")]
pub use verifiers::http::HttpVerifier;
#[cfg(feature = "oidc")]
pub use verifiers::oidc::{AuthorizationRequest, ClaimConstraint, OidcConfig, OidcVerifier};
