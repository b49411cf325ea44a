//! Outbound lookup clients.
//!
//! Every external capability the verifiers consume lives behind a small
//! trait here, with one production implementation each: the GitHub API,
//! remote JSON key sets, OIDC provider discovery, DNS TXT lookups, the
//! HTTPS well-known proof fetch, and the clock. Traits keep the verifiers
//! deterministic under test; the implementations carry the timeouts and
//! the tracing, and never retry. Dropping a lookup future cancels the
//! underlying request, so an inbound deadline bounds every downstream
//! call.

pub mod clock;
#[cfg(feature = "oidc")]
pub mod discovery;
#[cfg(feature = "domain")]
pub mod dns;
#[cfg(feature = "github")]
pub mod github;
#[cfg(feature = "domain")]
pub mod http;
#[cfg(any(feature = "github", feature = "oidc"))]
pub mod jwks;

pub use clock::{Clock, FixedClock, SystemClock};
#[cfg(feature = "oidc")]
pub use discovery::{HttpProviderDiscovery, ProviderDiscovery, ProviderMetadata};
#[cfg(feature = "domain")]
pub use dns::{DnsResolver, SystemDnsResolver};
#[cfg(feature = "github")]
pub use github::{GitHubApiClient, GitHubLookup};
#[cfg(feature = "domain")]
pub use http::{ProofFetcher, WellKnownFetcher, WELL_KNOWN_PROOF_PATH};
#[cfg(any(feature = "github", feature = "oidc"))]
pub use jwks::{HttpKeySetFetcher, JsonWebKey, KeySet, KeySetFetcher};
