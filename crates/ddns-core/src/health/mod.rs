//! Health verifier
//!
//! Checks that public name resolution for a managed name reflects the
//! expected addresses. This compares against live DNS, not the provider's
//! records, so it also catches propagation lag.
//!
//! ## Classification
//!
//! | resolution                       | result                                   |
//! |----------------------------------|------------------------------------------|
//! | family resolved, address matches | ok                                       |
//! | family resolved, address differs | `Inconsistent { actual: resolved, expect: Some(expected) }` |
//! | family expected, never resolved  | `Inconsistent { actual: expected, expect: None }` |

use crate::error::{Error, Result};
use crate::request::{AddressCheck, HealthCheckRequest, fully_qualified_name};
use crate::traits::{IpSource, NameResolver};
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use tracing::debug;

/// Confirmed addresses of a successful health check
///
/// Both fields are `None` for the bare liveness probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<Ipv6Addr>,
}

/// Verifies public resolution against expected addresses
#[derive(Clone)]
pub struct HealthVerifier {
    ip_source: Arc<dyn IpSource>,
    resolver: Arc<dyn NameResolver>,
}

impl HealthVerifier {
    /// Create a verifier
    ///
    /// `ip_source` is only consulted for families requested without a value.
    pub fn new(ip_source: Arc<dyn IpSource>, resolver: Arc<dyn NameResolver>) -> Self {
        Self {
            ip_source,
            resolver,
        }
    }

    /// Run a health check
    pub async fn verify(&self, request: &HealthCheckRequest) -> Result<HealthStatus> {
        if request.ipv4.is_skip() && request.ipv6.is_skip() {
            return Ok(HealthStatus::default());
        }

        let zone = request
            .zone
            .as_deref()
            .filter(|z| !z.is_empty())
            .ok_or_else(|| Error::missing("zone"))?;
        let host = fully_qualified_name(zone, request.record.as_deref());

        let expected_v4 = match request.ipv4 {
            AddressCheck::Skip => None,
            AddressCheck::Expect(ip) => Some(ip),
            AddressCheck::Discover => Some(self.ip_source.current_v4().await?),
        };
        let expected_v6 = match request.ipv6 {
            AddressCheck::Skip => None,
            AddressCheck::Expect(ip) => Some(ip),
            AddressCheck::Discover => Some(self.ip_source.current_v6().await?),
        };

        let resolved = self.resolver.resolve(&host).await?;
        debug!("{} resolved to {:?}", host, resolved);

        let mut seen_v4 = false;
        let mut seen_v6 = false;
        for addr in resolved {
            let expected = match addr {
                IpAddr::V4(_) => {
                    seen_v4 = true;
                    expected_v4.map(IpAddr::V4)
                }
                IpAddr::V6(_) => {
                    seen_v6 = true;
                    expected_v6.map(IpAddr::V6)
                }
            };

            if let Some(expected) = expected
                && addr != expected
            {
                return Err(Error::Inconsistent {
                    host,
                    actual: addr,
                    expect: Some(expected),
                });
            }
        }

        if let Some(expected) = expected_v4
            && !seen_v4
        {
            return Err(Error::Inconsistent {
                host,
                actual: IpAddr::V4(expected),
                expect: None,
            });
        }
        if let Some(expected) = expected_v6
            && !seen_v6
        {
            return Err(Error::Inconsistent {
                host,
                actual: IpAddr::V6(expected),
                expect: None,
            });
        }

        Ok(HealthStatus {
            ipv4: expected_v4,
            ipv6: expected_v6,
        })
    }
}
