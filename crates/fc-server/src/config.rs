use std::net::{SocketAddr, SocketAddrV4, Ipv4Addr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Host name advertised in flight locations. Defaults to the bound IP,
    /// or `localhost` when bound to an unspecified address.
    pub host: Option<String>,
    pub store_capacity: u64,
    pub tls: Option<TlsConfig>,
    /// Require clients to present a certificate chaining to `client_ca_path`.
    pub verify_client: bool,
    pub client_ca_path: Option<PathBuf>,
    pub max_payload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5005)),
            host: None,
            store_capacity: fc_store::DEFAULT_CAPACITY,
            tls: None,
            verify_client: false,
            client_ca_path: None,
            max_payload_size: 100 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.verify_client {
            if self.tls.is_none() {
                return Err(ServerError::Config("verify_client requires tls".into()));
            }
            if self.client_ca_path.is_none() {
                return Err(ServerError::Config(
                    "verify_client requires client_ca_path".into(),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn advertised_host(&self, local_addr: SocketAddr) -> String {
        match &self.host {
            Some(host) => host.clone(),
            None if local_addr.ip().is_unspecified() => "localhost".into(),
            None => local_addr.ip().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}
