// # ddnsd
//
// HTTP surface of the DDNS reconciliation service.
//
// - `GET /` reconciles A/AAAA records with the addresses in the query
// - `GET /healthz` checks public resolution against expected addresses
//
// All DNS logic lives in ddns-core; this crate only translates between HTTP
// and the core types.

pub mod api;
pub mod token;

pub use api::{AppState, router};
