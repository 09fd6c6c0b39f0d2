use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

/// Channel selector of a location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    /// Plaintext channel (`grpc+tcp`, `tcp`, `http`).
    Tcp,
    /// TLS-secured channel (`grpc+tls`, `tls`, `https`).
    Tls,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "grpc+tcp",
            Self::Tls => "grpc+tls",
        }
    }

    fn http_scheme(self) -> &'static str {
        match self {
            Self::Tcp => "http",
            Self::Tls => "https",
        }
    }
}

impl FromStr for Scheme {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grpc+tcp" | "grpc" | "tcp" | "http" => Ok(Self::Tcp),
            "grpc+tls" | "tls" | "https" => Ok(Self::Tls),
            other => Err(ProtocolError::InvalidLocation {
                location: other.to_string(),
                reason: "unknown scheme".into(),
            }),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network address of a peer: `scheme://host:port`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
}

impl Location {
    pub fn new(scheme: Scheme, host: impl Into<String>, port: u16) -> Self {
        Self { scheme, host: host.into(), port }
    }

    pub fn for_tcp(host: impl Into<String>, port: u16) -> Self {
        Self::new(Scheme::Tcp, host, port)
    }

    pub fn for_tls(host: impl Into<String>, port: u16) -> Self {
        Self::new(Scheme::Tls, host, port)
    }

    /// Parse `scheme://host:port`.
    pub fn parse(uri: &str) -> ProtocolResult<Self> {
        let (scheme, rest) = uri.split_once("://").ok_or_else(|| invalid(uri, "missing scheme"))?;
        let scheme: Scheme = scheme.parse().map_err(|_| invalid(uri, "unknown scheme"))?;
        Self::parse_authority(uri, scheme, rest)
    }

    /// Parse either a full location or a bare `host:port`, which takes
    /// `default_scheme`.
    pub fn parse_with_default(uri: &str, default_scheme: Scheme) -> ProtocolResult<Self> {
        if uri.contains("://") {
            Self::parse(uri)
        } else {
            Self::parse_authority(uri, default_scheme, uri)
        }
    }

    fn parse_authority(uri: &str, scheme: Scheme, authority: &str) -> ProtocolResult<Self> {
        let authority = authority.trim_end_matches('/');
        let (host, port) = authority
            .rsplit_once(':')
            .ok_or_else(|| invalid(uri, "missing port"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(invalid(uri, "missing host"));
        }
        let port = port.parse::<u16>().map_err(|_| invalid(uri, "invalid port"))?;
        Ok(Self::new(scheme, host, port))
    }

    pub fn is_tls(&self) -> bool {
        self.scheme == Scheme::Tls
    }

    /// Base URL of the HTTP transport serving this location.
    pub fn base_url(&self) -> String {
        if self.host.contains(':') {
            format!("{}://[{}]:{}", self.scheme.http_scheme(), self.host, self.port)
        } else {
            format!("{}://{}:{}", self.scheme.http_scheme(), self.host, self.port)
        }
    }
}

fn invalid(uri: &str, reason: &str) -> ProtocolError {
    ProtocolError::InvalidLocation {
        location: uri.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", self.scheme, self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

impl FromStr for Location {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Location {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.to_string()
    }
}
