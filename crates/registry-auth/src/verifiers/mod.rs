//! Identity verifiers.
//!
//! One module per trust protocol. Every verifier turns method-specific
//! credentials plus external lookups into the same
//! [`VerifiedCredentials`](crate::claims::VerifiedCredentials) bundle,
//! which the token service signs. Verifiers are stateless per call (the
//! generic OIDC flow's session store is the one exception), never retry,
//! and never log -- failures surface as typed errors for the adapter.

#[cfg(feature = "anonymous")]
pub mod anonymous;
#[cfg(feature = "domain")]
pub mod dns;
#[cfg(feature = "domain")]
pub(crate) mod domain;
#[cfg(feature = "github")]
pub mod github;
#[cfg(feature = "github")]
pub mod github_oidc;
#[cfg(feature = "domain")]
pub mod http;
#[cfg(feature = "oidc")]
pub mod oidc;
