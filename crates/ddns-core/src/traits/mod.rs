//! Core traits for the DDNS service
//!
//! This module defines the capabilities the core algorithms drive.
//!
//! - [`DnsProvider`]: Read and update records via a provider API
//! - [`IpSource`]: Discover the current public address
//! - [`NameResolver`]: Resolve names as the public sees them

pub mod dns_provider;
pub mod ip_source;
pub mod name_resolver;

pub use dns_provider::{
    DnsProvider, DnsProviderFactory, DnsRecord, RecordType, UpdateResult, Zone,
};
pub use ip_source::{IpSource, IpVersion};
pub use name_resolver::{NameResolver, ResolutionResult};
