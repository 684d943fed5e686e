//! Test doubles and helpers for the HTTP surface tests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    DnsProvider, DnsProviderFactory, DnsRecord, IpSource, IpVersion, NameResolver, RecordType,
    ResolutionResult, Zone,
};
use ddns_core::{HealthVerifier, Reconciler};
use ddnsd::AppState;
use http_body_util::BodyExt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// In-memory provider shared between the factory and the test
#[derive(Clone, Default)]
pub struct FakeProvider {
    zones: Arc<Mutex<Vec<Zone>>>,
    records: Arc<Mutex<Vec<DnsRecord>>>,
    tokens: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(self, name: &str) -> Self {
        self.zones.lock().unwrap().push(Zone {
            id: format!("zone-{name}"),
            name: name.to_string(),
        });
        self
    }

    pub fn with_record(self, name: &str, record_type: RecordType, content: &str) -> Self {
        let id = format!("rec-{}", self.records.lock().unwrap().len());
        self.records.lock().unwrap().push(DnsRecord {
            id,
            name: name.to_string(),
            record_type,
            content: content.to_string(),
            proxied: false,
            ttl: 300,
        });
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn content(&self, name: &str, record_type: RecordType) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name == name && r.record_type == record_type)
            .map(|r| r.content.clone())
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for FakeProvider {
    async fn find_zones(&self, name: &str) -> Result<Vec<Zone>> {
        if self.fail {
            return Err(Error::provider("fake", "API unavailable"));
        }
        Ok(self
            .zones
            .lock()
            .unwrap()
            .iter()
            .filter(|z| z.name == name)
            .cloned()
            .collect())
    }

    async fn list_records(
        &self,
        _zone_id: &str,
        record_type: RecordType,
        name: &str,
    ) -> Result<Vec<DnsRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.name == name && r.record_type == record_type)
            .cloned()
            .collect())
    }

    async fn update_record(&self, _zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        for stored in self.records.lock().unwrap().iter_mut() {
            if stored.id == record.id {
                *stored = record.clone();
            }
        }
        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

impl DnsProviderFactory for FakeProvider {
    fn create(&self, token: &str) -> Result<Box<dyn DnsProvider>> {
        self.tokens.lock().unwrap().push(token.to_string());
        Ok(Box::new(self.clone()))
    }
}

/// IpSource answering with fixed addresses
#[derive(Clone, Default)]
pub struct FixedIpSource {
    pub v4: Option<IpAddr>,
    pub v6: Option<IpAddr>,
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self, version: IpVersion) -> Result<IpAddr> {
        match version {
            IpVersion::V4 => self.v4,
            IpVersion::V6 => self.v6,
        }
        .ok_or_else(|| Error::ip_source("no route to echo service"))
    }
}

/// NameResolver answering with a fixed list, or failing when empty
#[derive(Clone, Default)]
pub struct FixedResolver {
    pub addrs: Vec<IpAddr>,
}

impl FixedResolver {
    pub fn new(addrs: &[&str]) -> Self {
        Self {
            addrs: addrs.iter().map(|a| a.parse().unwrap()).collect(),
        }
    }
}

#[async_trait::async_trait]
impl NameResolver for FixedResolver {
    async fn resolve(&self, _host: &str) -> Result<ResolutionResult> {
        if self.addrs.is_empty() {
            return Err(Error::resolution("Name or service not known"));
        }
        Ok(self.addrs.clone())
    }
}

/// Everything a test wires into the router
pub struct TestApp {
    pub provider: FakeProvider,
    pub ip_source: FixedIpSource,
    pub resolver: FixedResolver,
    pub token_file: Option<PathBuf>,
}

impl TestApp {
    pub fn new(provider: FakeProvider) -> Self {
        Self {
            provider,
            ip_source: FixedIpSource::default(),
            resolver: FixedResolver::default(),
            token_file: None,
        }
    }

    pub fn router(&self) -> Router {
        ddnsd::router(AppState::new(
            Reconciler::new(Arc::new(self.provider.clone())),
            HealthVerifier::new(
                Arc::new(self.ip_source.clone()),
                Arc::new(self.resolver.clone()),
            ),
            self.token_file.clone(),
        ))
    }

    /// Issue a GET and decode the JSON body
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
