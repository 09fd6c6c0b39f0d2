//! rustls configuration for the resolution server.

use std::path::Path;
use std::sync::Arc;

use rustls::crypto::ring;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::RootCertStore;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Load the TLS material named by `config`, if TLS is enabled.
pub fn load_rustls_config(config: &ServerConfig) -> ServerResult<Option<rustls::ServerConfig>> {
    let Some(tls) = &config.tls else {
        return Ok(None);
    };
    let cert_pem = read(&tls.cert_path)?;
    let key_pem = read(&tls.key_path)?;
    let client_ca = match (&config.client_ca_path, config.verify_client) {
        (Some(path), true) => Some(read(path)?),
        (None, true) => {
            return Err(ServerError::Config("verify_client requires client_ca_path".into()))
        }
        (_, false) => None,
    };
    build_rustls_config(&cert_pem, &key_pem, client_ca.as_deref()).map(Some)
}

/// Build a server config from PEM material. With `client_ca_pem`, clients
/// must present a certificate chaining to it.
pub fn build_rustls_config(
    cert_pem: &[u8],
    key_pem: &[u8],
    client_ca_pem: Option<&[u8]>,
) -> ServerResult<rustls::ServerConfig> {
    let certs = parse_certs(cert_pem, "server certificate")?;
    let key = PrivateKeyDer::from_pem_slice(key_pem)
        .map_err(|e| ServerError::Tls(format!("invalid private key: {e:?}")))?;
    let provider = Arc::new(ring::default_provider());

    let builder = rustls::ServerConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(tls_error)?;
    let builder = match client_ca_pem {
        Some(pem) => {
            let mut roots = RootCertStore::empty();
            for cert in parse_certs(pem, "client CA")? {
                roots.add(cert).map_err(tls_error)?;
            }
            let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
                .build()
                .map_err(tls_error)?;
            builder.with_client_cert_verifier(verifier)
        }
        None => builder.with_no_client_auth(),
    };
    let mut config = builder.with_single_cert(certs, key).map_err(tls_error)?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Ok(config)
}

fn parse_certs(pem: &[u8], what: &str) -> ServerResult<Vec<CertificateDer<'static>>> {
    let certs = CertificateDer::pem_slice_iter(pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::Tls(format!("invalid {what}: {e:?}")))?;
    if certs.is_empty() {
        return Err(ServerError::Tls(format!("no certificates in {what}")));
    }
    Ok(certs)
}

fn read(path: &Path) -> ServerResult<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))
}

fn tls_error(e: impl std::fmt::Display) -> ServerError {
    ServerError::Tls(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TlsConfig;

    const CERT: &[u8] = include_bytes!("../../fc-client/tests/fixtures/server.pem");
    const KEY: &[u8] = include_bytes!("../../fc-client/tests/fixtures/server-key.pem");
    const CA: &[u8] = include_bytes!("../../fc-client/tests/fixtures/ca.pem");

    #[test]
    fn builds_plain_tls() {
        let config = build_rustls_config(CERT, KEY, None).unwrap();
        assert_eq!(config.alpn_protocols, vec![b"http/1.1".to_vec()]);
    }

    #[test]
    fn builds_mutual_tls() {
        assert!(build_rustls_config(CERT, KEY, Some(CA)).is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            build_rustls_config(b"not a pem", KEY, None),
            Err(ServerError::Tls(_))
        ));
        assert!(build_rustls_config(CERT, b"", None).is_err());
    }

    #[test]
    fn no_tls_configured() {
        assert!(load_rustls_config(&ServerConfig::default()).unwrap().is_none());
    }

    #[test]
    fn missing_files_are_config_errors() {
        let config = ServerConfig {
            tls: Some(TlsConfig {
                cert_path: "/nonexistent/cert.pem".into(),
                key_path: "/nonexistent/key.pem".into(),
            }),
            ..Default::default()
        };
        assert!(matches!(load_rustls_config(&config), Err(ServerError::Config(_))));
    }
}
