use std::path::Path;

use serde::{Deserialize, Serialize};

/// Certificate chain and private key presented by one side of a TLS channel,
/// both PEM encoded.
#[derive(Clone, Serialize, Deserialize)]
pub struct TlsIdentity {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

impl TlsIdentity {
    pub fn new(cert_pem: impl Into<Vec<u8>>, key_pem: impl Into<Vec<u8>>) -> Self {
        Self { cert_pem: cert_pem.into(), key_pem: key_pem.into() }
    }

    /// Read a certificate chain and key from PEM files.
    pub fn from_files(cert_path: &Path, key_path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(std::fs::read(cert_path)?, std::fs::read(key_path)?))
    }

    /// Certificate chain followed by the key, as one PEM bundle.
    pub fn to_pem_bundle(&self) -> Vec<u8> {
        let mut bundle = Vec::with_capacity(self.cert_pem.len() + self.key_pem.len() + 1);
        bundle.extend_from_slice(&self.cert_pem);
        if !bundle.ends_with(b"\n") {
            bundle.push(b'\n');
        }
        bundle.extend_from_slice(&self.key_pem);
        bundle
    }
}

impl std::fmt::Debug for TlsIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsIdentity")
            .field("cert_pem", &format_args!("{} bytes", self.cert_pem.len()))
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

/// TLS material a client uses when connecting to `grpc+tls` locations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClientTlsConfig {
    /// PEM root certificate(s) the server chain must verify against. When
    /// unset only the built-in web roots are trusted.
    pub root_cert_pem: Option<Vec<u8>>,
    /// Client certificate for servers that require mutual TLS.
    pub identity: Option<TlsIdentity>,
}

impl ClientTlsConfig {
    pub fn with_root(mut self, root_cert_pem: impl Into<Vec<u8>>) -> Self {
        self.root_cert_pem = Some(root_cert_pem.into());
        self
    }

    pub fn with_identity(mut self, identity: TlsIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn is_mutual(&self) -> bool {
        self.identity.is_some()
    }

    pub fn display_name(&self) -> &'static str {
        match (&self.root_cert_pem, &self.identity) {
            (_, Some(_)) => "mutual-tls",
            (Some(_), None) => "tls-custom-root",
            (None, None) => "tls-web-roots",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_material() {
        let cfg = ClientTlsConfig::default();
        assert!(cfg.root_cert_pem.is_none());
        assert!(!cfg.is_mutual());
        assert_eq!(cfg.display_name(), "tls-web-roots");
    }

    #[test]
    fn builders_and_display_names() {
        let cfg = ClientTlsConfig::default().with_root(b"root".to_vec());
        assert_eq!(cfg.display_name(), "tls-custom-root");
        let cfg = cfg.with_identity(TlsIdentity::new(b"cert".to_vec(), b"key".to_vec()));
        assert!(cfg.is_mutual());
        assert_eq!(cfg.display_name(), "mutual-tls");
    }

    #[test]
    fn pem_bundle_separates_parts() {
        let id = TlsIdentity::new(b"CERT".to_vec(), b"KEY\n".to_vec());
        assert_eq!(id.to_pem_bundle(), b"CERT\nKEY\n");
    }

    #[test]
    fn debug_redacts_key() {
        let id = TlsIdentity::new(b"CERT".to_vec(), b"SECRET".to_vec());
        let debug = format!("{id:?}");
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("redacted"));
    }
}
