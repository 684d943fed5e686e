//! Configuration types for the DDNS service
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default location of the fallback API token
pub const DEFAULT_TOKEN_FILE: &str = "/run/secrets/token";

/// Cloudflare API v4 base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default IPv4 echo service
pub const DEFAULT_IPV4_SOURCE_URL: &str = "https://api.ipify.org/";

/// Default IPv6 echo service
pub const DEFAULT_IPV6_SOURCE_URL: &str = "https://api6.ipify.org/";

/// Main DDNS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// DNS provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Public IP source configuration
    #[serde(default)]
    pub ip_source: IpSourceConfig,

    /// Name resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl DdnsConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.server.validate()?;
        self.provider.validate()?;
        self.ip_source.validate()?;
        self.resolver.validate()?;
        Ok(())
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// File holding the API token used when a request carries none
    ///
    /// `None` disables the fallback. A configured but absent file is not an
    /// error.
    #[serde(default = "default_token_file")]
    pub token_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Validate the server configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if let Some(path) = &self.token_file
            && path.as_os_str().is_empty()
        {
            return Err(crate::Error::config("Token file path cannot be empty"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            token_file: default_token_file(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 80))
}

fn default_token_file() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_TOKEN_FILE))
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    ///
    /// Carries no token: tokens arrive with each request.
    Cloudflare {
        /// API base URL
        #[serde(default = "default_cloudflare_api_base")]
        api_base_url: String,
        /// Timeout for each API call (in seconds)
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                api_base_url,
                timeout_secs,
            } => {
                validate_url("Cloudflare API base URL", api_base_url)?;
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("Cloudflare API timeout must be > 0"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Cloudflare {
            api_base_url: default_cloudflare_api_base(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_cloudflare_api_base() -> String {
    CLOUDFLARE_API_BASE.to_string()
}

/// Public IP source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpSourceConfig {
    /// HTTP echo services returning the caller's address as plain text
    Http {
        /// URL answering with the caller's IPv4 address
        #[serde(default = "default_ipv4_url")]
        ipv4_url: String,
        /// URL answering with the caller's IPv6 address
        #[serde(default = "default_ipv6_url")]
        ipv6_url: String,
        /// Request timeout (in seconds)
        #[serde(default = "default_ip_source_timeout_secs")]
        timeout_secs: u64,
    },
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            IpSourceConfig::Http {
                ipv4_url,
                ipv6_url,
                timeout_secs,
            } => {
                validate_url("IPv4 source URL", ipv4_url)?;
                validate_url("IPv6 source URL", ipv6_url)?;
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("HTTP IP source timeout must be > 0"));
                }
                Ok(())
            }
        }
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        IpSourceConfig::Http {
            ipv4_url: default_ipv4_url(),
            ipv6_url: default_ipv6_url(),
            timeout_secs: default_ip_source_timeout_secs(),
        }
    }
}

fn default_ipv4_url() -> String {
    DEFAULT_IPV4_SOURCE_URL.to_string()
}

fn default_ipv6_url() -> String {
    DEFAULT_IPV6_SOURCE_URL.to_string()
}

/// Name resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Timeout for a single lookup (in seconds)
    #[serde(default = "default_resolve_timeout_secs")]
    pub timeout_secs: u64,
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Resolver timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_resolve_timeout_secs(),
        }
    }
}

fn validate_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{} cannot be empty", what)));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            what, url
        )));
    }
    Ok(())
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_ip_source_timeout_secs() -> u64 {
    10
}

fn default_resolve_timeout_secs() -> u64 {
    10
}
