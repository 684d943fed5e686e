// # ddnsd - DDNS Daemon
//
// This daemon is a THIN integration layer:
// - DO NOT add DNS logic here; it belongs in ddns-core
// - Configuration is via environment variables ONLY
//
// The ddnsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the provider factory, IP source and resolver
// 4. Serving the HTTP API until SIGINT/SIGTERM
//
// ## Configuration
//
// ### Server
// - `DDNS_LISTEN_ADDR`: Address to bind (default: 0.0.0.0:80)
// - `DDNS_TOKEN_FILE`: Fallback token file (default: /run/secrets/token, empty disables)
//
// ### DNS Provider
// - `DDNS_PROVIDER_TYPE`: Provider type (cloudflare)
// - `DDNS_PROVIDER_API_BASE`: API base URL
// - `DDNS_PROVIDER_TIMEOUT_SECS`: Timeout per API call
//
// ### IP Source
// - `DDNS_IPV4_SOURCE_URL`: Echo service for IPv4 (default: https://api.ipify.org/)
// - `DDNS_IPV6_SOURCE_URL`: Echo service for IPv6 (default: https://api6.ipify.org/)
// - `DDNS_IP_SOURCE_TIMEOUT_SECS`: Timeout per request
//
// ### Resolver
// - `DDNS_RESOLVE_TIMEOUT_SECS`: Timeout per lookup
//
// ### Logging
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export DDNS_LISTEN_ADDR=0.0.0.0:8080
// export DDNS_TOKEN_FILE=/run/secrets/cloudflare_token
//
// ddnsd
// curl 'http://localhost:8080/?zone=example.com&record=home&ipv4=198.51.100.7'
// ```

use anyhow::{Context, Result};
use ddns_core::config::{DdnsConfig, IpSourceConfig, ProviderConfig};
use ddns_core::{HealthVerifier, Reconciler, SystemResolver};
use ddns_ip_http::HttpIpSource;
use ddns_provider_cloudflare::CloudflareFactory;
use ddnsd::AppState;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    ddns: DdnsConfig,
    provider_type: String,
    log_level: String,
}

/// Parse an optional environment variable, failing on garbage
fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", name, value, e)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(anyhow::anyhow!("{}: {}", name, e)),
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let mut ddns = DdnsConfig::new();

        if let Some(addr) = parse_env("DDNS_LISTEN_ADDR")? {
            ddns.server.listen_addr = addr;
        }
        if let Ok(path) = env::var("DDNS_TOKEN_FILE") {
            ddns.server.token_file = (!path.is_empty()).then(|| PathBuf::from(path));
        }

        let ProviderConfig::Cloudflare {
            api_base_url,
            timeout_secs,
        } = &mut ddns.provider;
        if let Ok(base) = env::var("DDNS_PROVIDER_API_BASE") {
            *api_base_url = base;
        }
        if let Some(secs) = parse_env("DDNS_PROVIDER_TIMEOUT_SECS")? {
            *timeout_secs = secs;
        }

        let IpSourceConfig::Http {
            ipv4_url,
            ipv6_url,
            timeout_secs,
        } = &mut ddns.ip_source;
        if let Ok(url) = env::var("DDNS_IPV4_SOURCE_URL") {
            *ipv4_url = url;
        }
        if let Ok(url) = env::var("DDNS_IPV6_SOURCE_URL") {
            *ipv6_url = url;
        }
        if let Some(secs) = parse_env("DDNS_IP_SOURCE_TIMEOUT_SECS")? {
            *timeout_secs = secs;
        }

        if let Some(secs) = parse_env("DDNS_RESOLVE_TIMEOUT_SECS")? {
            ddns.resolver.timeout_secs = secs;
        }

        Ok(Self {
            ddns,
            provider_type: env::var("DDNS_PROVIDER_TYPE")
                .unwrap_or_else(|_| "cloudflare".to_string()),
            log_level: env::var("DDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        // Validate provider type
        match self.provider_type.as_str() {
            "cloudflare" => {} // Currently supported
            _ => anyhow::bail!(
                "DDNS_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: cloudflare",
                self.provider_type
            ),
        }

        self.ddns.validate()?;

        // Validate log level
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

/// Whether provider calls would carry the API token over plain HTTP
fn sends_token_in_clear(config: &DdnsConfig) -> bool {
    let ProviderConfig::Cloudflare { api_base_url, .. } = &config.provider;
    api_base_url.starts_with("http://")
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");

    // Warn if using HTTP (not HTTPS)
    if sends_token_in_clear(&config.ddns) {
        warn!(
            "DDNS_PROVIDER_API_BASE uses HTTP (not HTTPS). \
            API tokens will travel in clear text."
        );
    }

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let (listener, state) = match startup(&config.ddns).await {
            Ok(ready) => ready,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        if let Err(e) = serve(listener, state).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the components and bind the listener
async fn startup(config: &DdnsConfig) -> Result<(TcpListener, AppState)> {
    let factory = CloudflareFactory::from_config(&config.provider)
        .context("Failed to create DNS provider factory")?;
    let ip_source =
        HttpIpSource::from_config(&config.ip_source).context("Failed to create IP source")?;
    let resolver = SystemResolver::from_config(&config.resolver);

    info!("Provider type: {}", config.provider.type_name());
    match &config.server.token_file {
        Some(path) => info!("Fallback token file: {}", path.display()),
        None => info!("Fallback token file disabled"),
    }

    let state = AppState::new(
        Reconciler::new(Arc::new(factory)),
        HealthVerifier::new(Arc::new(ip_source), Arc::new(resolver)),
        config.server.token_file.clone(),
    );

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen_addr))?;

    Ok((listener, state))
}

/// Serve the API until a shutdown signal arrives
async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, ddnsd::router(state))
        .with_graceful_shutdown(async {
            let signal = wait_for_shutdown().await;
            info!("Received shutdown signal: {}", signal);
            info!("Shutting down daemon");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> &'static str {
    // Set up signal handlers for SIGTERM and SIGINT
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to setup signal handlers: {}", e);
            return wait_for_ctrl_c().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> &'static str {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to wait for CTRL-C: {}", e);
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
