// # ddns-core
//
// Core library for the DDNS reconciliation service.
//
// ## Architecture Overview
//
// This library provides the domain logic behind the HTTP surface:
// - **DnsProvider**: Trait for reading and updating records via a provider API
// - **IpSource**: Trait for discovering the current public address
// - **NameResolver**: Trait for resolving names as the public sees them
// - **Reconciler**: Brings A/AAAA records in line with desired addresses
// - **HealthVerifier**: Checks live resolution against expected addresses
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider, IP
//    source and resolver implementations
// 2. **Stateless**: Every request is handled from scratch; nothing is cached
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Idempotency**: Records already holding the desired address are never
//    rewritten

pub mod config;
pub mod error;
pub mod health;
pub mod reconciler;
pub mod request;
pub mod resolver;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, IpSourceConfig, ProviderConfig, ResolverConfig, ServerConfig};
pub use error::{Error, Result};
pub use health::{HealthStatus, HealthVerifier};
pub use reconciler::{ReconcileReport, Reconciler};
pub use request::{AddressCheck, HealthCheckRequest, UpdateRequest, fully_qualified_name};
pub use resolver::SystemResolver;
pub use traits::{DnsProvider, DnsProviderFactory, IpSource, NameResolver};
