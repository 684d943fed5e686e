//! Test doubles and common utilities for contract tests
//!
//! The fakes record every call so tests can assert on exactly which
//! collaborator calls an algorithm made.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    DnsProvider, DnsProviderFactory, DnsRecord, IpSource, IpVersion, NameResolver, RecordType,
    ResolutionResult, Zone,
};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared state behind [`MockDnsProvider`]
#[derive(Default)]
struct ProviderState {
    zones: Vec<Zone>,
    records: Vec<(String, DnsRecord)>,
    updates: Vec<(String, DnsRecord)>,
    fail_updates: bool,
    fail_update_for: Option<String>,
    fail_lookups: bool,
}

/// An in-memory DnsProvider that tracks calls
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
    zone_lookups: Arc<AtomicUsize>,
    record_lookups: Arc<AtomicUsize>,
    tokens: Arc<Mutex<Vec<String>>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone
    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().zones.push(Zone {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Add a record to a zone
    pub fn with_record(
        self,
        zone_id: &str,
        id: &str,
        name: &str,
        record_type: RecordType,
        content: &str,
    ) -> Self {
        self.state.lock().unwrap().records.push((
            zone_id.to_string(),
            DnsRecord {
                id: id.to_string(),
                name: name.to_string(),
                record_type,
                content: content.to_string(),
                proxied: false,
                ttl: 300,
            },
        ));
        self
    }

    /// Change proxied/ttl of a stored record
    pub fn with_record_settings(self, id: &str, proxied: bool, ttl: u32) -> Self {
        for (_, record) in self.state.lock().unwrap().records.iter_mut() {
            if record.id == id {
                record.proxied = proxied;
                record.ttl = ttl;
            }
        }
        self
    }

    /// Make every update call fail
    pub fn failing_updates(self) -> Self {
        self.state.lock().unwrap().fail_updates = true;
        self
    }

    /// Make updates of one record fail
    pub fn failing_update_for(self, record_id: &str) -> Self {
        self.state.lock().unwrap().fail_update_for = Some(record_id.to_string());
        self
    }

    /// Clear all injected failures
    pub fn recover(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_updates = false;
        state.fail_update_for = None;
        state.fail_lookups = false;
    }

    /// Make every record lookup fail
    pub fn failing_lookups(self) -> Self {
        self.state.lock().unwrap().fail_lookups = true;
        self
    }

    pub fn zone_lookup_count(&self) -> usize {
        self.zone_lookups.load(Ordering::SeqCst)
    }

    pub fn record_lookup_count(&self) -> usize {
        self.record_lookups.load(Ordering::SeqCst)
    }

    /// Updates issued, in order, with their zone id
    pub fn updates(&self) -> Vec<(String, DnsRecord)> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn update_count(&self) -> usize {
        self.state.lock().unwrap().updates.len()
    }

    /// Tokens the factory was asked to authenticate with
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    /// Current content of a stored record
    pub fn content_of(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|(_, r)| r.id == id)
            .map(|(_, r)| r.content.clone())
    }

    /// A factory handing out clients that share this provider's state
    pub fn factory(&self) -> Arc<dyn DnsProviderFactory> {
        Arc::new(MockProviderFactory {
            provider: self.clone(),
        })
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn find_zones(&self, name: &str) -> Result<Vec<Zone>> {
        self.zone_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .state
            .lock()
            .unwrap()
            .zones
            .iter()
            .filter(|z| z.name == name)
            .cloned()
            .collect())
    }

    async fn list_records(
        &self,
        zone_id: &str,
        record_type: RecordType,
        name: &str,
    ) -> Result<Vec<DnsRecord>> {
        self.record_lookups.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if state.fail_lookups {
            return Err(Error::provider("mock", "lookup failed"));
        }
        Ok(state
            .records
            .iter()
            .filter(|(z, r)| z == zone_id && r.record_type == record_type && r.name == name)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn update_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        let mut state = self.state.lock().unwrap();
        if state.fail_updates || state.fail_update_for.as_deref() == Some(record.id.as_str()) {
            return Err(Error::provider("mock", "update rejected"));
        }
        state.updates.push((zone_id.to_string(), record.clone()));
        for (_, stored) in state.records.iter_mut() {
            if stored.id == record.id {
                *stored = record.clone();
            }
        }
        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Factory handing out a shared [`MockDnsProvider`]
pub struct MockProviderFactory {
    provider: MockDnsProvider,
}

impl DnsProviderFactory for MockProviderFactory {
    fn create(&self, token: &str) -> Result<Box<dyn DnsProvider>> {
        self.provider.tokens.lock().unwrap().push(token.to_string());
        Ok(Box::new(self.provider.clone()))
    }
}

/// An IpSource answering from fixed values
#[derive(Clone, Default)]
pub struct StaticIpSource {
    v4: Option<IpAddr>,
    v6: Option<IpAddr>,
    calls: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(v4: Option<&str>, v6: Option<&str>) -> Self {
        Self {
            v4: v4.map(|s| s.parse().unwrap()),
            v6: v6.map(|s| s.parse().unwrap()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self, version: IpVersion) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = match version {
            IpVersion::V4 => self.v4,
            IpVersion::V6 => self.v6,
        };
        answer.ok_or_else(|| Error::ip_source("service unreachable"))
    }
}

/// A NameResolver answering from a fixed list
#[derive(Clone, Default)]
pub struct StaticResolver {
    answer: Option<Vec<IpAddr>>,
    hosts: Arc<Mutex<Vec<String>>>,
}

impl StaticResolver {
    /// Resolve every name to `addrs`
    pub fn new(addrs: &[&str]) -> Self {
        Self {
            answer: Some(addrs.iter().map(|a| a.parse().unwrap()).collect()),
            hosts: Arc::default(),
        }
    }

    /// Fail every lookup as NXDOMAIN
    pub fn nxdomain() -> Self {
        Self {
            answer: None,
            hosts: Arc::default(),
        }
    }

    /// Hosts resolved, in order
    pub fn hosts(&self) -> Vec<String> {
        self.hosts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NameResolver for StaticResolver {
    async fn resolve(&self, host: &str) -> Result<ResolutionResult> {
        self.hosts.lock().unwrap().push(host.to_string());
        self.answer
            .clone()
            .ok_or_else(|| Error::resolution("Name or service not known"))
    }
}
