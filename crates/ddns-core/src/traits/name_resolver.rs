// # Name Resolver Trait
//
// Defines the interface for resolving a hostname the way any client on the
// internet would see it (a getaddrinfo-style lookup).
//
// ## Implementations
//
// - System resolver: `ddns_core::resolver::SystemResolver`

use async_trait::async_trait;
use std::net::IpAddr;

/// Addresses returned by one resolution, in resolver order
///
/// May hold zero, one or several entries per family.
pub type ResolutionResult = Vec<IpAddr>;

/// Trait for name resolution
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve `host` to all of its addresses
    ///
    /// # Returns
    ///
    /// - `Ok(ResolutionResult)`: Every address the resolver returned
    /// - `Err(Error::Resolution)`: NXDOMAIN, timeout or resolver failure
    async fn resolve(&self, host: &str) -> Result<ResolutionResult, crate::Error>;
}
