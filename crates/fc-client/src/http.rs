use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use fc_protocol::{
    endpoints, Action, ActionType, ErrorCode, FlightCodec, FlightInfo, FlightMessage, Location,
    ProtocolError, OCTET_STREAM,
};
use fc_types::{FlightDescriptor, Ticket};
use reqwest::header::CONTENT_TYPE;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{Connector, FlightTransport};

/// Builds [`HttpTransport`]s that share one connection pool and TLS setup.
#[derive(Clone, Debug)]
pub struct HttpConnector {
    client: reqwest::Client,
}

impl HttpConnector {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout);
        if let Some(tls) = &config.tls {
            if let Some(root) = &tls.root_cert_pem {
                let cert = reqwest::Certificate::from_pem(root)
                    .map_err(|e| ClientError::Config(format!("invalid root certificate: {e}")))?;
                builder = builder.tls_built_in_root_certs(false).add_root_certificate(cert);
            }
            if let Some(identity) = &tls.identity {
                let identity = reqwest::Identity::from_pem(&identity.to_pem_bundle())
                    .map_err(|e| ClientError::Config(format!("invalid client identity: {e}")))?;
                builder = builder.identity(identity);
            }
            tracing::debug!(mode = tls.display_name(), "configured client TLS");
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(error_chain(&e)))?;
        Ok(Self { client })
    }
}

impl Connector for HttpConnector {
    fn connect(&self, location: &Location) -> ClientResult<Arc<dyn FlightTransport>> {
        Ok(Arc::new(HttpTransport {
            client: self.client.clone(),
            location: location.clone(),
        }))
    }
}

/// Flight transport speaking framed messages over HTTP(S).
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    location: Location,
}

impl HttpTransport {
    async fn call(&self, path: &str, msg: &FlightMessage) -> ClientResult<FlightMessage> {
        let body = FlightCodec::encode(msg)?;
        let url = format!("{}{}", self.location.base_url(), path);
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(body)
            .send()
            .await
            .map_err(|e| self.unavailable(&e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.unavailable(&e))?;
        if status.is_success() {
            return Ok(FlightCodec::decode_exact(&bytes)?);
        }
        Err(match FlightCodec::decode_exact(&bytes) {
            Ok(FlightMessage::Error { code, message }) => ClientError::from_remote(code, message),
            _ => ClientError::from_remote(
                ErrorCode::from_http_status(status.as_u16()),
                format!("HTTP {status}: {}", String::from_utf8_lossy(&bytes)),
            ),
        })
    }

    fn unavailable(&self, e: &reqwest::Error) -> ClientError {
        tracing::warn!(location = %self.location, error = %e, "request failed");
        ClientError::Unavailable(format!("{}: {}", self.location, error_chain(e)))
    }
}

fn unexpected(expected: &'static str, actual: &FlightMessage) -> ClientError {
    ProtocolError::UnexpectedMessage { expected, actual: actual.type_name() }.into()
}

/// Render an error with its sources; TLS failures hide the cause a few levels down.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[async_trait]
impl FlightTransport for HttpTransport {
    fn location(&self) -> &Location {
        &self.location
    }

    async fn list_flights(&self, criteria: &[u8]) -> ClientResult<Vec<FlightInfo>> {
        let msg = FlightMessage::ListFlights { criteria: criteria.to_vec() };
        match self.call(endpoints::LIST_FLIGHTS, &msg).await? {
            FlightMessage::FlightList { flights } => Ok(flights),
            other => Err(unexpected("FlightList", &other)),
        }
    }

    async fn get_flight_info(&self, descriptor: &FlightDescriptor) -> ClientResult<FlightInfo> {
        let msg = FlightMessage::GetFlightInfo { descriptor: descriptor.clone() };
        match self.call(endpoints::FLIGHT_INFO, &msg).await? {
            FlightMessage::Info { info } => Ok(info),
            other => Err(unexpected("Info", &other)),
        }
    }

    async fn do_get(&self, ticket: &Ticket) -> ClientResult<Bytes> {
        let msg = FlightMessage::DoGet { ticket: ticket.clone() };
        match self.call(endpoints::DO_GET, &msg).await? {
            FlightMessage::RecordBatch { data, .. } => Ok(Bytes::from(data)),
            other => Err(unexpected("RecordBatch", &other)),
        }
    }

    async fn do_put(&self, descriptor: &FlightDescriptor, data: &[u8]) -> ClientResult<u64> {
        let msg = FlightMessage::DoPut { descriptor: descriptor.clone(), data: data.to_vec() };
        match self.call(endpoints::DO_PUT, &msg).await? {
            FlightMessage::PutAck { bytes_written } => Ok(bytes_written),
            other => Err(unexpected("PutAck", &other)),
        }
    }

    async fn do_action(&self, action: &Action) -> ClientResult<Vec<Vec<u8>>> {
        let msg = FlightMessage::DoAction { action: action.clone() };
        match self.call(endpoints::DO_ACTION, &msg).await? {
            FlightMessage::ActionResults { results } => Ok(results),
            other => Err(unexpected("ActionResults", &other)),
        }
    }

    async fn list_actions(&self) -> ClientResult<Vec<ActionType>> {
        match self.call(endpoints::LIST_ACTIONS, &FlightMessage::ListActions).await? {
            FlightMessage::ActionList { actions } => Ok(actions),
            other => Err(unexpected("ActionList", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_protocol::{ClientTlsConfig, TlsIdentity};

    #[test]
    fn connector_builds_for_plain_and_tls() {
        assert!(HttpConnector::new(&ClientConfig::default()).is_ok());
        let tls = ClientTlsConfig::default()
            .with_root(include_bytes!("../tests/fixtures/ca.pem").to_vec())
            .with_identity(TlsIdentity::new(
                include_bytes!("../tests/fixtures/client.pem").to_vec(),
                include_bytes!("../tests/fixtures/client-key.pem").to_vec(),
            ));
        assert!(HttpConnector::new(&ClientConfig::default().with_tls(tls)).is_ok());
    }

    #[test]
    fn identity_without_key_is_a_config_error() {
        let tls = ClientTlsConfig::default().with_identity(TlsIdentity::new(
            include_bytes!("../tests/fixtures/client.pem").to_vec(),
            b"not a key".to_vec(),
        ));
        assert!(matches!(
            HttpConnector::new(&ClientConfig::default().with_tls(tls)),
            Err(ClientError::Config(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_peer_is_unavailable() {
        // Bind then drop to get a port with nothing listening.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let connector = HttpConnector::new(&ClientConfig::default()).unwrap();
        let transport = connector.connect(&Location::for_tcp("127.0.0.1", port)).unwrap();
        let err = transport.do_action(&Action::new("healthcheck")).await.unwrap_err();
        assert!(err.is_unavailable(), "{err}");
    }
}
