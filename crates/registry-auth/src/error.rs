//! Error types for authentication operations
//!
//! This module defines all error types that can occur during identity
//! verification, token issuance, and token validation.

use thiserror::Error;

/// Authentication error types.
///
/// The variants follow the failure classes of the auth pipeline: malformed
/// input is rejected before any network or crypto work, upstream lookup
/// failures surface without retry, proof and token failures are terminal,
/// and policy denial is its own explicit outcome.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input failed syntactic validation before any lookup was attempted.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// An upstream lookup (identity API, key set, DNS, HTTPS fetch) failed.
    ///
    /// Verifiers never retry; retry policy belongs to the caller.
    #[error("Upstream lookup failed: {0}")]
    Upstream(String),

    /// The presented proof did not establish control of the identity.
    #[error("Proof rejected: {0}")]
    ProofRejected(String),

    /// Issuance was blocked because a namespace root is deny-listed.
    #[error("Policy denied: namespace '{0}' is blocked")]
    PolicyDenied(String),

    /// Token could not be parsed as a signed token.
    #[error("Malformed token: {0}")]
    TokenMalformed(String),

    /// Token signature did not verify.
    #[error("Invalid token signature")]
    BadSignature,

    /// Token has expired.
    #[error("Token has expired")]
    TokenExpired,

    /// Token is not yet valid.
    #[error("Token not yet valid")]
    TokenNotYetValid,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Rejected proofs and invalid tokens are expected traffic and should
    /// not be logged as server errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::Internal(_) | AuthError::ConfigError(_))
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MalformedInput(_) => 400,

            AuthError::ProofRejected(_)
            | AuthError::TokenMalformed(_)
            | AuthError::BadSignature
            | AuthError::TokenExpired
            | AuthError::TokenNotYetValid => 401,

            AuthError::PolicyDenied(_) => 403,

            AuthError::Upstream(_) => 502,

            AuthError::ConfigError(_) | AuthError::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedInput(_) => "MALFORMED_INPUT",
            AuthError::Upstream(_) => "UPSTREAM_UNAVAILABLE",
            AuthError::ProofRejected(_) => "PROOF_REJECTED",
            AuthError::PolicyDenied(_) => "POLICY_DENIED",
            AuthError::TokenMalformed(_) => "TOKEN_MALFORMED",
            AuthError::BadSignature => "BAD_SIGNATURE",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::TokenNotYetValid => "TOKEN_NOT_YET_VALID",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::MalformedInput("x".into()).status_code(), 400);
        assert_eq!(AuthError::ProofRejected("x".into()).status_code(), 401);
        assert_eq!(AuthError::TokenExpired.status_code(), 401);
        assert_eq!(AuthError::PolicyDenied("x".into()).status_code(), 403);
        assert_eq!(AuthError::Upstream("x".into()).status_code(), 502);
        assert_eq!(AuthError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_server_error_classification() {
        assert!(AuthError::Internal("x".into()).is_server_error());
        assert!(AuthError::ConfigError("x".into()).is_server_error());
        assert!(!AuthError::ProofRejected("x".into()).is_server_error());
        assert!(!AuthError::TokenExpired.is_server_error());
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(AuthError::PolicyDenied("x".into()).error_code(), "POLICY_DENIED");
        assert_eq!(AuthError::BadSignature.error_code(), "BAD_SIGNATURE");
    }
}
