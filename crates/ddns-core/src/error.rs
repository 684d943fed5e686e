//! Error types for the DDNS service
//!
//! Every failure of a reconcile or health-check request is one of these
//! variants. None of them are retried internally; the HTTP layer maps each to
//! a status code and a JSON body.

use crate::traits::RecordType;
use std::net::IpAddr;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS service
#[derive(Error, Debug)]
pub enum Error {
    /// A required request parameter was absent or empty
    #[error("Missing {0} URL parameter.")]
    MissingParameter(String),

    /// A request parameter was present but malformed
    #[error("Invalid {name} URL parameter: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// The provider has no zone with the requested name
    #[error("Zone {0} does not exist.")]
    ZoneNotFound(String),

    /// The zone has no record of the requested type for the name
    #[error("{record_type} record for {name} does not exist.")]
    RecordNotFound {
        /// Record type that was looked up
        record_type: RecordType,
        /// Fully-qualified record name
        name: String,
    },

    /// The DNS provider API reported a failure
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Name resolution failed (NXDOMAIN, timeout, ...)
    #[error("{0}")]
    Resolution(String),

    /// The public IP source could not report an address
    #[error("IP source error: {0}")]
    IpSource(String),

    /// Live resolution disagrees with the expected address
    ///
    /// `expect` is `None` when the address family is missing from
    /// resolution altogether; `actual` then carries the expected value.
    #[error("inconsistent IP addresses")]
    Inconsistent {
        /// Host that was resolved
        host: String,
        /// Address observed
        actual: IpAddr,
        /// Address expected, if the family was resolved at all
        expect: Option<IpAddr>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (secret file, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a missing parameter error
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter(name.into())
    }

    /// Create an invalid parameter error
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a name resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
