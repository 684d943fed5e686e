// # IP Source Trait
//
// Defines the interface for discovering the caller's current public address.
// The health check uses it when a family is requested without an explicit
// expected value.
//
// ## Implementations
//
// - HTTP echo services: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// async fn show(source: &dyn IpSource) -> ddns_core::Result<()> {
//     let v4 = source.current_v4().await?;
//     println!("public IPv4: {v4}");
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// IP version (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Version of an address
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }
}

/// Trait for public IP source implementations
///
/// Each call is a single network round trip; sources do not cache and do
/// not retry.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Fetch the current public address of the given version
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current address
    /// - `Err(Error::IpSource)`: If the address could not be determined
    async fn current(&self, version: IpVersion) -> Result<IpAddr, crate::Error>;

    /// Fetch the current public IPv4 address
    async fn current_v4(&self) -> Result<Ipv4Addr, crate::Error> {
        match self.current(IpVersion::V4).await? {
            IpAddr::V4(ip) => Ok(ip),
            other => Err(crate::Error::ip_source(format!(
                "Expected IPv4, got: {}",
                other
            ))),
        }
    }

    /// Fetch the current public IPv6 address
    async fn current_v6(&self) -> Result<Ipv6Addr, crate::Error> {
        match self.current(IpVersion::V6).await? {
            IpAddr::V6(ip) => Ok(ip),
            other => Err(crate::Error::ip_source(format!(
                "Expected IPv6, got: {}",
                other
            ))),
        }
    }
}
