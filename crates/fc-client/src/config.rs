use std::time::Duration;

use fc_protocol::{ClientTlsConfig, Location, Scheme};

use crate::error::ClientResult;

/// How a [`ResolutionClient`](crate::ResolutionClient) reaches its peers.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Scheme applied to bare `host:port` locations.
    pub scheme: Scheme,
    pub tls: Option<ClientTlsConfig>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::Tcp,
            tls: None,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    /// Use TLS with the given material; bare locations default to `grpc+tls`.
    pub fn with_tls(mut self, tls: ClientTlsConfig) -> Self {
        self.scheme = Scheme::Tls;
        self.tls = Some(tls);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn parse_location(&self, uri: &str) -> ClientResult<Location> {
        Ok(Location::parse_with_default(uri, self.scheme)?)
    }
}
