// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare DNS provider implementation for the DDNS
// reconciliation service.
//
// ## Behaviour
//
// - One HTTP request per trait call; no retries, no backoff, no caching
// - HTTP timeout configured on the shared client
// - Specific error wording for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - API messages from the response envelope are carried into errors
// - Zone and record lookups never fail on "no match": they return empty lists
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Tokens arrive per request; the factory holds none
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...&match=all`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::ProviderConfig;
use ddns_core::traits::{DnsProvider, DnsProviderFactory, DnsRecord, RecordType, Zone};
use ddns_core::{Error, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER_NAME: &str = "cloudflare";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloudflare v4 response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

fn describe(errors: &[ApiMessage]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Body of a record update; the id travels in the URL
#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    record_type: RecordType,
    content: &'a str,
    proxied: bool,
    ttl: u32,
}

impl<'a> From<&'a DnsRecord> for RecordPayload<'a> {
    fn from(record: &'a DnsRecord) -> Self {
        Self {
            name: &record.name,
            record_type: record.record_type,
            content: &record.content,
            proxied: record.proxied,
            ttl: record.ttl,
        }
    }
}

fn provider_error(message: impl Into<String>) -> Error {
    Error::provider(PROVIDER_NAME, message)
}

/// Map a non-success HTTP status to an error
fn status_error(status: StatusCode, action: &str, detail: String) -> Error {
    match status.as_u16() {
        401 | 403 => provider_error(format!(
            "Authentication failed: Invalid API token or insufficient permissions. Status: {} - {}",
            status, detail
        )),
        404 => provider_error(format!("{}: not found. Status: {} - {}", action, status, detail)),
        409 => provider_error(format!(
            "Conflict: Record is being updated by another process. Status: {} - {}",
            status, detail
        )),
        429 => provider_error(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => provider_error(format!(
            "Cloudflare server error (transient): {} - {}",
            status, detail
        )),
        _ => provider_error(format!("{} failed: {} - {}", action, status, detail)),
    }
}

/// Cloudflare DNS provider client bound to one API token
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL, without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider client
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Read and DNS:Edit permissions
    /// - `api_base`: API base URL (normally `https://api.cloudflare.com/client/v4`)
    /// - `client`: Shared HTTP client, carrying the request timeout
    pub fn new(
        api_token: impl Into<String>,
        api_base: impl Into<String>,
        client: reqwest::Client,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        Ok(Self {
            api_token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Send one authenticated request and unwrap the v4 envelope
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> Result<T> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| provider_error(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| provider_error(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| describe(&envelope.errors))
                .unwrap_or(body);
            return Err(status_error(status, action, detail));
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body)
            .map_err(|e| provider_error(format!("Failed to parse response: {}", e)))?;

        if !envelope.success {
            let detail = describe(&envelope.errors).unwrap_or_else(|| "unknown error".to_string());
            return Err(provider_error(format!("{} failed: {}", action, detail)));
        }

        envelope.result.ok_or_else(|| {
            provider_error(format!("Invalid response format: {} returned no result", action))
        })
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn find_zones(&self, name: &str) -> Result<Vec<Zone>> {
        tracing::debug!("Looking up Cloudflare zone: {}", name);

        let request = self.client.get(self.url("/zones")).query(&[("name", name)]);
        let zones: Vec<Zone> = self.send(request, "Zone lookup").await?;

        tracing::debug!("Found {} zone(s) named {}", zones.len(), name);
        Ok(zones)
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com&type=A&match=all
    /// Authorization: Bearer <token>
    /// ```
    async fn list_records(
        &self,
        zone_id: &str,
        record_type: RecordType,
        name: &str,
    ) -> Result<Vec<DnsRecord>> {
        tracing::debug!("Looking up records: {} (type: {})", name, record_type);

        let request = self
            .client
            .get(self.url(&format!("/zones/{}/dns_records", zone_id)))
            .query(&[
                ("name", name),
                ("type", record_type.as_str()),
                ("match", "all"),
            ]);
        let records: Vec<DnsRecord> = self.send(request, "Record lookup").await?;

        // The API filters server-side; guard against a lenient match anyway
        Ok(records
            .into_iter()
            .filter(|r| r.record_type == record_type && r.name.eq_ignore_ascii_case(name))
            .collect())
    }

    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "name": "home.example.com",
    ///   "type": "A",
    ///   "content": "1.2.3.4",
    ///   "proxied": false,
    ///   "ttl": 300
    /// }
    /// ```
    async fn update_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        let request = self
            .client
            .put(self.url(&format!("/zones/{}/dns_records/{}", zone_id, record.id)))
            .json(&RecordPayload::from(record));
        let updated: DnsRecord = self.send(request, "Record update").await?;

        tracing::info!(
            "DNS record updated successfully: {} -> {}",
            updated.name,
            updated.content
        );
        Ok(updated)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating Cloudflare provider clients
///
/// Holds one HTTP client shared by every request's provider.
#[derive(Debug, Clone)]
pub struct CloudflareFactory {
    api_base: String,
    client: reqwest::Client,
}

impl CloudflareFactory {
    /// Create a factory for the given API base URL and timeout
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_base: api_base.into(),
            client,
        })
    }

    /// Create a factory from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare {
                api_base_url,
                timeout_secs,
            } => Self::new(api_base_url.clone(), Duration::from_secs(*timeout_secs)),
        }
    }
}

impl Default for CloudflareFactory {
    fn default() -> Self {
        Self {
            api_base: ddns_core::config::CLOUDFLARE_API_BASE.to_string(),
            client: reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl DnsProviderFactory for CloudflareFactory {
    fn create(&self, token: &str) -> Result<Box<dyn DnsProvider>> {
        Ok(Box::new(CloudflareProvider::new(
            token,
            self.api_base.clone(),
            self.client.clone(),
        )?))
    }
}
