//! Record reconciler
//!
//! The Reconciler is responsible for:
//! - Finding the zone for a request
//! - Looking up the existing A/AAAA records for the managed name
//! - Skipping records that already hold the desired address
//! - Updating the rest while preserving proxied and ttl
//!
//! ## Flow
//!
//! ```text
//! UpdateRequest
//!      │
//!      ▼
//! ┌──────────────┐  find_zones   ┌─────────────┐
//! │  Reconciler  │──────────────▶│ DnsProvider │
//! │              │  list_records │             │
//! │              │──────────────▶│             │
//! │              │ update_record │             │
//! │              │──────────────▶│             │
//! └──────────────┘               └─────────────┘
//!      │
//!      ▼
//! ReconcileReport
//! ```
//!
//! All lookups complete before the first write, so a missing record for
//! one family never leaves the other family half-updated. A provider error
//! during the write phase aborts the request; writes already issued stay
//! applied, and a retry of the whole request converges because unchanged
//! records are skipped.

use crate::error::{Error, Result};
use crate::request::UpdateRequest;
use crate::traits::{
    DnsProvider, DnsProviderFactory, DnsRecord, IpVersion, RecordType, UpdateResult,
};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one reconcile request, per family
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Result for the A record, if IPv4 was requested
    pub ipv4: Option<UpdateResult>,
    /// Result for the AAAA record, if IPv6 was requested
    pub ipv6: Option<UpdateResult>,
}

impl ReconcileReport {
    /// Number of update calls issued
    pub fn writes(&self) -> usize {
        [&self.ipv4, &self.ipv6]
            .into_iter()
            .flatten()
            .filter(|r| r.is_write())
            .count()
    }

    fn record(&mut self, record_type: RecordType, result: UpdateResult) {
        match record_type {
            RecordType::A => self.ipv4 = Some(result),
            RecordType::Aaaa => self.ipv6 = Some(result),
        }
    }
}

/// Brings provider records in line with the desired addresses
///
/// Stateless: a single instance serves all requests concurrently.
#[derive(Clone)]
pub struct Reconciler {
    factory: Arc<dyn DnsProviderFactory>,
}

impl Reconciler {
    /// Create a reconciler that builds provider clients with `factory`
    pub fn new(factory: Arc<dyn DnsProviderFactory>) -> Self {
        Self { factory }
    }

    /// Reconcile the records named by `request`
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileReport)`: Every requested family now holds its address
    /// - `Err(Error::ZoneNotFound)`: No zone with that name
    /// - `Err(Error::RecordNotFound)`: A requested family has no record
    /// - `Err(Error::Provider)`: The provider API failed
    pub async fn reconcile(&self, request: &UpdateRequest) -> Result<ReconcileReport> {
        let provider = self.factory.create(request.token())?;
        let fqdn = request.fqdn();

        debug!("Looking up zone {}", request.zone());
        let zone = provider
            .find_zones(request.zone())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ZoneNotFound(request.zone().to_string()))?;
        debug!("Found zone {} ({})", zone.name, zone.id);

        // Resolve every requested record before touching any of them
        let mut plan: Vec<(DnsRecord, IpAddr)> = Vec::new();
        for desired in request.desired() {
            let record = self.first_record(provider.as_ref(), &zone.id, &fqdn, desired).await?;
            plan.push((record, desired));
        }

        let mut report = ReconcileReport::default();
        for (record, desired) in plan {
            let result = self
                .apply(provider.as_ref(), &zone.id, &record, desired)
                .await?;
            report.record(record.record_type, result);
        }

        Ok(report)
    }

    /// Find the record to act on for one family
    ///
    /// When the provider holds several records of the same type and name,
    /// the first one is used.
    async fn first_record(
        &self,
        provider: &dyn DnsProvider,
        zone_id: &str,
        fqdn: &str,
        desired: IpAddr,
    ) -> Result<DnsRecord> {
        let record_type = RecordType::for_version(IpVersion::of(&desired));
        debug!("Looking up {} record for {}", record_type, fqdn);

        let records = provider.list_records(zone_id, record_type, fqdn).await?;
        if records.len() > 1 {
            debug!(
                "{} {} records found for {}, using the first",
                records.len(),
                record_type,
                fqdn
            );
        }

        records
            .into_iter()
            .next()
            .ok_or_else(|| Error::RecordNotFound {
                record_type,
                name: fqdn.to_string(),
            })
    }

    /// Update one record unless it already holds `desired`
    async fn apply(
        &self,
        provider: &dyn DnsProvider,
        zone_id: &str,
        record: &DnsRecord,
        desired: IpAddr,
    ) -> Result<UpdateResult> {
        if record.points_to(desired) {
            info!(
                "{} record {} already has IP {}, skipping update",
                record.record_type, record.name, desired
            );
            return Ok(UpdateResult::Unchanged {
                current_ip: desired,
            });
        }

        info!(
            "Updating {} record {} -> {} (was: {}) via {}",
            record.record_type,
            record.name,
            desired,
            record.content,
            provider.provider_name()
        );
        provider
            .update_record(zone_id, &record.with_content(desired))
            .await?;

        Ok(UpdateResult::Updated {
            previous_content: record.content.clone(),
            new_ip: desired,
        })
    }
}
