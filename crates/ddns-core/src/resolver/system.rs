// # System Resolver
//
// NameResolver backed by the operating system's resolver.
//
// ## Purpose
//
// Resolves names exactly as any other process on the host would, through
// getaddrinfo (via `tokio::net::lookup_host`), so the health check sees what
// public clients see rather than the provider's authoritative data.
//
// ## Timeouts
//
// getaddrinfo has no deadline of its own; every lookup is wrapped in a
// `tokio::time::timeout` and a timeout is reported as a resolution error.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::Error;
use crate::config::ResolverConfig;
use crate::traits::name_resolver::{NameResolver, ResolutionResult};

/// Resolver using the host's getaddrinfo
#[derive(Debug, Clone)]
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    /// Create a resolver with a per-lookup timeout
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Create a resolver from configuration
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(Duration::from_secs(config.timeout_secs))
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

#[async_trait]
impl NameResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<ResolutionResult, Error> {
        debug!("Resolving {}", host);

        let addrs = tokio::time::timeout(self.timeout, tokio::net::lookup_host((host, 0)))
            .await
            .map_err(|_| {
                Error::resolution(format!(
                    "Resolution of {} timed out after {:?}",
                    host, self.timeout
                ))
            })?
            .map_err(|e| Error::resolution(e.to_string()))?;

        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}
