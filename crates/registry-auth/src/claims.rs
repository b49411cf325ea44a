//! Token claims for registry authentication
//!
//! This module defines the claims carried by registry tokens and the
//! normalized credential bundle every identity verifier produces. Claims
//! are constructed fresh per issuance and never persisted server-side; the
//! signed token is the only artifact that crosses the trust boundary.

use chrono::{DateTime, Utc};
use registry_permissions::Permission;
use serde::{Deserialize, Serialize};

/// Authentication method used to establish the subject identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// GitHub access token resolved to user and organization namespaces.
    GithubAt,

    /// GitHub Actions workload-identity OIDC token.
    GithubOidc,

    /// Configurable OIDC provider (direct exchange or authorization code).
    Oidc,

    /// Domain ownership proven via a DNS TXT record.
    Dns,

    /// Domain ownership proven via an HTTPS well-known resource.
    Http,

    /// No proof; fixed anonymous namespace.
    Anonymous,
}

impl AuthMethod {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::GithubAt => "github_at",
            AuthMethod::GithubOidc => "github_oidc",
            AuthMethod::Oidc => "oidc",
            AuthMethod::Dns => "dns",
            AuthMethod::Http => "http",
            AuthMethod::Anonymous => "anonymous",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "github_at" => Some(AuthMethod::GithubAt),
            "github_oidc" => Some(AuthMethod::GithubOidc),
            "oidc" => Some(AuthMethod::Oidc),
            "dns" => Some(AuthMethod::Dns),
            "http" => Some(AuthMethod::Http),
            "anonymous" => Some(AuthMethod::Anonymous),
            _ => None,
        }
    }
}

/// The normalized output of every identity verifier.
///
/// Each of the six verification protocols resolves into this same shape:
/// who was verified, how, and which grants that identity carries. The
/// token service turns it into signed claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCredentials {
    /// Method that established the identity.
    pub auth_method: AuthMethod,

    /// Method-specific subject (login, repository owner, email, domain,
    /// or the fixed anonymous subject).
    pub subject: String,

    /// Grants derived from the identity (or from configuration, for the
    /// generic OIDC method). May legitimately be empty.
    pub permissions: Vec<Permission>,
}

impl VerifiedCredentials {
    /// Create a new credential bundle.
    pub fn new(
        auth_method: AuthMethod,
        subject: impl Into<String>,
        permissions: Vec<Permission>,
    ) -> Self {
        Self {
            auth_method,
            subject: subject.into(),
            permissions,
        }
    }
}

/// Registry token claims.
///
/// Registered temporal fields plus the authentication context. Permission
/// order is preserved through the signed token byte-for-byte.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryClaims {
    /// Issuer.
    pub iss: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Not before (Unix timestamp).
    pub nbf: i64,

    /// Authentication method used.
    pub auth_method: AuthMethod,

    /// Method-specific subject identity.
    pub auth_method_subject: String,

    /// Ordered permission grants.
    pub permissions: Vec<Permission>,
}

impl RegistryClaims {
    /// Build claims for a verified identity, valid from `now` for
    /// `lifetime`.
    pub fn new(
        credentials: VerifiedCredentials,
        issuer: impl Into<String>,
        now: DateTime<Utc>,
        lifetime: chrono::Duration,
    ) -> Self {
        let iat = now.timestamp();
        Self {
            iss: issuer.into(),
            iat,
            exp: (now + lifetime).timestamp(),
            nbf: iat,
            auth_method: credentials.auth_method,
            auth_method_subject: credentials.subject,
            permissions: credentials.permissions,
        }
    }

    /// Get expiration as a DateTime.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Check if the claims are expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
