//! Anonymous verifier.
//!
//! Compiled in only with the `anonymous` cargo feature; without it the
//! capability does not exist. With it, verification requires no proof and
//! always grants exactly the shared anonymous namespace.

use registry_permissions::Permission;

use crate::claims::{AuthMethod, VerifiedCredentials};

/// Namespace shared by all anonymous publishes.
pub const ANONYMOUS_NAMESPACE: &str = "io.modelcontextprotocol.anonymous";

/// Subject recorded for anonymous tokens.
const ANONYMOUS_SUBJECT: &str = "anonymous";

/// Verifier requiring no proof of identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousVerifier;

impl AnonymousVerifier {
    /// Create the verifier.
    pub fn new() -> Self {
        Self
    }

    /// Produce anonymous credentials. Infallible.
    pub fn verify(&self) -> VerifiedCredentials {
        VerifiedCredentials::new(
            AuthMethod::Anonymous,
            ANONYMOUS_SUBJECT,
            vec![Permission::publish(format!("{}/*", ANONYMOUS_NAMESPACE))],
        )
    }
}
