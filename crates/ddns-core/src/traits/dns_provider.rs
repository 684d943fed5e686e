// # DNS Provider Trait
//
// Defines the calls the reconciler needs from a DNS provider API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{DnsProvider, RecordType};
//
// async fn show(provider: &dyn DnsProvider) -> ddns_core::Result<()> {
//     let zones = provider.find_zones("example.com").await?;
//     let records = provider
//         .list_records(&zones[0].id, RecordType::A, "home.example.com")
//         .await?;
//     println!("{records:?}");
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use super::ip_source::IpVersion;

/// DNS record type managed by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    #[serde(rename = "A")]
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Record type that carries addresses of the given version
    pub fn for_version(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => RecordType::A,
            IpVersion::V6 => RecordType::Aaaa,
        }
    }

    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS zone as known to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-assigned identifier
    pub id: String,
    /// Zone apex, e.g. "example.com"
    pub name: String,
}

/// An A or AAAA record as stored by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned identifier
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Address the record currently points at
    pub content: String,
    /// Provider-specific proxy flag; preserved on update
    #[serde(default)]
    pub proxied: bool,
    /// Time-to-live in seconds; preserved on update
    pub ttl: u32,
}

impl DnsRecord {
    /// Whether the record already points at `ip`
    ///
    /// Content that does not parse as an address never matches.
    pub fn points_to(&self, ip: IpAddr) -> bool {
        self.content
            .trim()
            .parse::<IpAddr>()
            .is_ok_and(|current| current == ip)
    }

    /// Copy of this record with only the content replaced
    pub fn with_content(&self, ip: IpAddr) -> Self {
        Self {
            content: ip.to_string(),
            ..self.clone()
        }
    }
}

/// Result of reconciling one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Record content was replaced
    Updated {
        /// Content before the update
        previous_content: String,
        /// The new IP address
        new_ip: IpAddr,
    },
    /// Record already had the desired address (no write issued)
    Unchanged {
        /// The current IP address
        current_ip: IpAddr,
    },
}

impl UpdateResult {
    /// Whether a write was issued against the provider
    pub fn is_write(&self) -> bool {
        matches!(self, UpdateResult::Updated { .. })
    }
}

/// Trait for DNS provider API clients
///
/// A client is bound to one credential and used for a single request.
/// Implementations perform exactly one API call per method and never retry;
/// deciding *whether* to update is the reconciler's job.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up zones whose name matches `name` exactly
    ///
    /// An unknown zone is an empty list, not an error.
    async fn find_zones(&self, name: &str) -> Result<Vec<Zone>, crate::Error>;

    /// List records of `record_type` named exactly `name` within a zone
    async fn list_records(
        &self,
        zone_id: &str,
        record_type: RecordType,
        name: &str,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Overwrite a record
    ///
    /// The full record is sent; callers keep name, type, proxied and ttl
    /// unchanged and only replace the content.
    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Builds provider clients bound to a caller-supplied credential
///
/// The token arrives with each request, so the reconciler asks the factory
/// for a fresh client every time.
pub trait DnsProviderFactory: Send + Sync {
    /// Create a client authenticated with `token`
    fn create(&self, token: &str) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
