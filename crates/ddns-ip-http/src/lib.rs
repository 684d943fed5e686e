// # HTTP IP Source
//
// This crate provides an HTTP-based IP source for the DDNS system.
//
// ## Purpose
//
// Discovers the service's own public address by asking an echo service
// (api.ipify.org by default) which answers with the caller's address as
// plain text. One URL per address family.
//
// ## Behaviour
//
// - One GET per call; the answer is never cached
// - Non-2xx statuses, unparsable bodies and wrong-family answers are errors

use ddns_core::config::IpSourceConfig;
use ddns_core::traits::{IpSource, IpVersion};
use ddns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default request timeout for the echo services
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL answering with the caller's IPv4 address
    ipv4_url: String,

    /// URL answering with the caller's IPv6 address
    ipv6_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `ipv4_url`: URL to fetch the IPv4 address from (e.g., "https://api.ipify.org/")
    /// - `ipv6_url`: URL to fetch the IPv6 address from (e.g., "https://api6.ipify.org/")
    /// - `timeout`: Per-request timeout
    pub fn new(
        ipv4_url: impl Into<String>,
        ipv6_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            ipv4_url: ipv4_url.into(),
            ipv6_url: ipv6_url.into(),
            client,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &IpSourceConfig) -> Result<Self> {
        match config {
            IpSourceConfig::Http {
                ipv4_url,
                ipv6_url,
                timeout_secs,
            } => Self::new(
                ipv4_url.clone(),
                ipv6_url.clone(),
                Duration::from_secs(*timeout_secs),
            ),
        }
    }

    fn url_for(&self, version: IpVersion) -> &str {
        match version {
            IpVersion::V4 => &self.ipv4_url,
            IpVersion::V6 => &self.ipv6_url,
        }
    }

    /// Fetch current IP from HTTP service
    async fn fetch_ip(&self, url: &str) -> Result<IpAddr> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "HTTP error from {}: {}",
                url,
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        let ip_text = ip_text.trim();

        ip_text
            .parse()
            .map_err(|_| Error::ip_source(format!("Invalid IP address: {}", ip_text)))
    }
}

impl Default for HttpIpSource {
    fn default() -> Self {
        Self {
            ipv4_url: ddns_core::config::DEFAULT_IPV4_SOURCE_URL.to_string(),
            ipv6_url: ddns_core::config::DEFAULT_IPV6_SOURCE_URL.to_string(),
            client: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self, version: IpVersion) -> Result<IpAddr> {
        let url = self.url_for(version);
        let ip = self.fetch_ip(url).await?;

        // Filter by IP version
        if IpVersion::of(&ip) != version {
            return Err(Error::ip_source(format!(
                "Expected {}, got: {}",
                match version {
                    IpVersion::V4 => "IPv4",
                    IpVersion::V6 => "IPv6",
                },
                ip
            )));
        }

        tracing::debug!("Public {:?} address from {}: {}", version, url, ip);
        Ok(ip)
    }
}
