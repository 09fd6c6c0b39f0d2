//! Resolution client for FlightCache.
//!
//! A [`ResolutionClient`] answers reads from the local object store first and
//! falls back to fetching from an owning peer's resolution server, caching
//! what it fetched locally before returning it. Peers are reached through the
//! [`FlightTransport`] seam; [`HttpTransport`] is the production transport.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;

#[cfg(test)]
mod e2e;

pub use client::ResolutionClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpConnector, HttpTransport};
pub use transport::{Connector, FlightTransport};
