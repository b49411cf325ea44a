//! DNS TXT lookup client.

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{AuthError, AuthResult};

/// Per-lookup timeout.
const DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// DNS resolution capability: domain to TXT record strings.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolve the TXT records published on `domain`. Multi-segment
    /// records come back concatenated, one string per record.
    async fn txt_records(&self, domain: &str) -> AuthResult<Vec<String>>;
}

/// Resolver backed by the host's DNS.
pub struct SystemDnsResolver {
    resolver: TokioAsyncResolver,
}

impl SystemDnsResolver {
    /// Create a resolver with the default upstream configuration, a
    /// bounded timeout, and a single attempt (no internal retry).
    pub fn new() -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = DNS_TIMEOUT;
        opts.attempts = 1;
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }

    /// Create a resolver from the system's resolv.conf.
    pub fn from_system_conf() -> AuthResult<Self> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| AuthError::ConfigError(format!("Invalid system DNS config: {}", e)))?;
        Ok(Self { resolver })
    }
}

impl Default for SystemDnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsResolver for SystemDnsResolver {
    #[instrument(skip(self))]
    async fn txt_records(&self, domain: &str) -> AuthResult<Vec<String>> {
        debug!("Resolving TXT records");

        let lookup = self
            .resolver
            .txt_lookup(domain)
            .await
            .map_err(|e| AuthError::Upstream(format!("DNS TXT lookup failed: {}", e)))?;

        Ok(lookup
            .iter()
            .map(|record| {
                record
                    .txt_data()
                    .iter()
                    .map(|segment| String::from_utf8_lossy(segment))
                    .collect::<String>()
            })
            .collect())
    }
}
