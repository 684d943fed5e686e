//! Typed request values
//!
//! Raw query parameters are turned into these types once, at the edge.
//! After construction an [`UpdateRequest`] is always valid and a
//! [`HealthCheckRequest`] always knows, per family, whether to skip,
//! discover or compare.

use crate::error::{Error, Result};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Name to manage: `record.zone`, or the zone apex when no record is given
///
/// An empty record label is treated as absent.
pub fn fully_qualified_name(zone: &str, record: Option<&str>) -> String {
    match record {
        Some(record) if !record.is_empty() => format!("{}.{}", record, zone),
        _ => zone.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_address<A>(name: &str, value: &str) -> Result<A>
where
    A: FromStr,
{
    value.trim().parse::<A>().map_err(|_| {
        Error::invalid(
            name,
            format!("'{}' is not a valid {} address", value, name),
        )
    })
}

/// A validated reconcile request
#[derive(Clone)]
pub struct UpdateRequest {
    token: String,
    zone: String,
    record: Option<String>,
    ipv4: Option<Ipv4Addr>,
    ipv6: Option<Ipv6Addr>,
}

// The token is a provider credential and must not reach logs
impl fmt::Debug for UpdateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRequest")
            .field("token", &"<REDACTED>")
            .field("zone", &self.zone)
            .field("record", &self.record)
            .field("ipv4", &self.ipv4)
            .field("ipv6", &self.ipv6)
            .finish()
    }
}

impl UpdateRequest {
    /// Create a validated request
    ///
    /// Checks, in order: token, zone, at least one address.
    pub fn new(
        token: impl Into<String>,
        zone: impl Into<String>,
        record: Option<String>,
        ipv4: Option<Ipv4Addr>,
        ipv6: Option<Ipv6Addr>,
    ) -> Result<Self> {
        let token = token.into();
        let zone = zone.into();

        if token.is_empty() {
            return Err(Error::missing("token"));
        }
        if zone.is_empty() {
            return Err(Error::missing("zone"));
        }
        if ipv4.is_none() && ipv6.is_none() {
            return Err(Error::missing("ipv4 or ipv6"));
        }

        Ok(Self {
            token,
            zone,
            record: non_empty(record),
            ipv4,
            ipv6,
        })
    }

    /// Build a request from raw query values
    ///
    /// Empty values count as absent. Addresses must parse as their family.
    pub fn from_params(
        token: Option<String>,
        zone: Option<String>,
        record: Option<String>,
        ipv4: Option<String>,
        ipv6: Option<String>,
    ) -> Result<Self> {
        let token = non_empty(token).ok_or_else(|| Error::missing("token"))?;
        let zone = non_empty(zone).ok_or_else(|| Error::missing("zone"))?;
        let ipv4 = non_empty(ipv4);
        let ipv6 = non_empty(ipv6);
        if ipv4.is_none() && ipv6.is_none() {
            return Err(Error::missing("ipv4 or ipv6"));
        }

        let ipv4 = ipv4
            .map(|v| parse_address::<Ipv4Addr>("ipv4", &v))
            .transpose()?;
        let ipv6 = ipv6
            .map(|v| parse_address::<Ipv6Addr>("ipv6", &v))
            .transpose()?;

        Self::new(token, zone, record, ipv4, ipv6)
    }

    /// Credential passed through to the provider
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Zone name
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Subdomain label, if any
    pub fn record(&self) -> Option<&str> {
        self.record.as_deref()
    }

    /// Desired IPv4 address
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        self.ipv4
    }

    /// Desired IPv6 address
    pub fn ipv6(&self) -> Option<Ipv6Addr> {
        self.ipv6
    }

    /// Name whose records are reconciled
    pub fn fqdn(&self) -> String {
        fully_qualified_name(&self.zone, self.record())
    }

    /// Requested addresses, IPv4 first
    pub fn desired(&self) -> Vec<IpAddr> {
        self.ipv4
            .map(IpAddr::V4)
            .into_iter()
            .chain(self.ipv6.map(IpAddr::V6))
            .collect()
    }
}

/// What to check for one address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressCheck<A> {
    /// Parameter absent: the family is not checked
    #[default]
    Skip,
    /// Parameter present but empty: ask the public IP source
    Discover,
    /// Parameter present with a value: compare against it
    Expect(A),
}

impl<A: FromStr> AddressCheck<A> {
    /// Interpret a raw query value for the parameter `name`
    pub fn from_param(name: &str, value: Option<&str>) -> Result<Self> {
        match value {
            None => Ok(AddressCheck::Skip),
            Some("") => Ok(AddressCheck::Discover),
            Some(v) => parse_address(name, v).map(AddressCheck::Expect),
        }
    }
}

impl<A> AddressCheck<A> {
    /// Whether the family is checked at all
    pub fn is_skip(&self) -> bool {
        matches!(self, AddressCheck::Skip)
    }
}

/// A health-check request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthCheckRequest {
    pub zone: Option<String>,
    pub record: Option<String>,
    pub ipv4: AddressCheck<Ipv4Addr>,
    pub ipv6: AddressCheck<Ipv6Addr>,
}

impl HealthCheckRequest {
    /// Build a request from raw query values
    ///
    /// Unlike [`UpdateRequest::from_params`], an empty `ipv4`/`ipv6` is
    /// meaningful here and selects discovery.
    pub fn from_params(
        zone: Option<String>,
        record: Option<String>,
        ipv4: Option<String>,
        ipv6: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            zone,
            record,
            ipv4: AddressCheck::from_param("ipv4", ipv4.as_deref())?,
            ipv6: AddressCheck::from_param("ipv6", ipv6.as_deref())?,
        })
    }
}
