use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use fc_protocol::{actions, Action, ActionType, FlightInfo, Location};
use fc_store::{SharedStore, StoreError};
use fc_types::{FlightDescriptor, ObjectId};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::HttpConnector;
use crate::transport::{Connector, FlightTransport};

/// Local-first client over a shared object store.
///
/// Owner hints are location strings; a bare `host:port` takes the configured
/// default scheme.
pub struct ResolutionClient {
    store: SharedStore,
    config: ClientConfig,
    connector: Arc<dyn Connector>,
}

impl ResolutionClient {
    /// Client reaching peers over HTTP with the TLS settings in `config`.
    pub fn new(store: SharedStore, config: ClientConfig) -> ClientResult<Self> {
        let connector = HttpConnector::new(&config)?;
        Ok(Self::with_connector(store, config, Arc::new(connector)))
    }

    pub fn with_connector(store: SharedStore, config: ClientConfig, connector: Arc<dyn Connector>) -> Self {
        Self { store, config, connector }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn parse_location(&self, uri: &str) -> ClientResult<Location> {
        self.config.parse_location(uri)
    }

    /// Store `data` locally under `id`. Objects are write-once.
    pub async fn put(&self, data: &[u8], id: ObjectId) -> ClientResult<()> {
        self.store.put_raw(id, data)?;
        tracing::debug!(object = %id.short_hex(), bytes = data.len(), "put object");
        Ok(())
    }

    /// Whether `id` is held locally or by `owner`.
    ///
    /// An unreachable owner counts as "no". Only a malformed owner location
    /// is an error.
    pub async fn exists(&self, id: &ObjectId, owner: Option<&str>) -> ClientResult<bool> {
        if self.store.contains(id)? {
            return Ok(true);
        }
        let Some(owner) = owner else {
            return Ok(false);
        };
        let owner = self.parse_location(owner)?;
        let transport = self.connector.connect(&owner)?;
        match transport.get_flight_info(&FlightDescriptor::for_object(id)).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::debug!(object = %id.short_hex(), %owner, error = %e, "remote probe failed");
                Ok(false)
            }
        }
    }

    /// Read `id`, fetching it from `owner` and caching it locally on a miss.
    pub async fn get(&self, id: &ObjectId, owner: Option<&str>) -> ClientResult<Bytes> {
        if let Some(data) = self.store.get_buffers(std::slice::from_ref(id))?.pop().flatten() {
            tracing::debug!(object = %id.short_hex(), "cache hit");
            return Ok(data);
        }
        let Some(owner) = owner else {
            return Err(ClientError::NotFound {
                message: "ObjectID not found".into(),
                id: *id,
            });
        };
        let owner = self.parse_location(owner)?;
        tracing::debug!(object = %id.short_hex(), %owner, "cache miss, fetching from owner");

        let data = self.fetch(id, &owner).await.map_err(|e| {
            if e.is_not_found() {
                ClientError::NotFound {
                    message: format!("ObjectID not found on {owner}"),
                    id: *id,
                }
            } else {
                e
            }
        })?;
        match self.store.put_raw(*id, &data) {
            Ok(()) => Ok(data),
            // Another writer got there first; its copy has the same content.
            Err(StoreError::AlreadyExists(_)) => Ok(self.store.get(id).unwrap_or(data)),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch `id` from `location` without touching the local store.
    pub async fn get_flight(&self, id: &ObjectId, location: &Location) -> ClientResult<Bytes> {
        self.fetch(id, location).await
    }

    pub async fn get_flight_info(
        &self,
        descriptor: &FlightDescriptor,
        location: &Location,
    ) -> ClientResult<FlightInfo> {
        self.connector.connect(location)?.get_flight_info(descriptor).await
    }

    /// Redeem the first endpoint of `info`.
    ///
    /// Advertised locations are tried in order. When none of them yields the
    /// payload, the ticket is redeemed at `origin`, the peer that answered
    /// the info lookup.
    pub async fn redeem(&self, info: &FlightInfo, origin: &Location) -> ClientResult<Bytes> {
        let endpoint = info
            .endpoints
            .first()
            .ok_or_else(|| ClientError::Decode(format!("flight {} has no endpoints", info.descriptor)))?;
        for location in endpoint.locations.iter().filter(|l| *l != origin) {
            match self.connector.connect(location)?.do_get(&endpoint.ticket).await {
                Ok(data) => return Ok(data),
                Err(e) if e.is_unavailable() || e.is_not_found() => {
                    tracing::warn!(%location, error = %e, "advertised endpoint failed, trying next");
                }
                Err(e) => return Err(e),
            }
        }
        self.connector.connect(origin)?.do_get(&endpoint.ticket).await
    }

    pub async fn list_flights(&self, location: &Location) -> ClientResult<Vec<FlightInfo>> {
        self.connector.connect(location)?.list_flights(&[]).await
    }

    /// Upload the local object `id` to `location`.
    pub async fn push(&self, id: &ObjectId, location: &Location) -> ClientResult<u64> {
        let data = self.store.get(id)?;
        let written = self
            .connector
            .connect(location)?
            .do_put(&FlightDescriptor::for_object(id), &data)
            .await?;
        tracing::info!(object = %id.short_hex(), %location, bytes = written, "pushed object");
        Ok(written)
    }

    pub async fn do_action(&self, location: &Location, name: &str) -> ClientResult<Vec<Vec<u8>>> {
        self.connector.connect(location)?.do_action(&Action::new(name)).await
    }

    pub async fn list_actions(&self, location: &Location) -> ClientResult<Vec<ActionType>> {
        self.connector.connect(location)?.list_actions().await
    }

    /// Poll `healthcheck` until `location` answers.
    ///
    /// Each attempt is bounded by `per_attempt_timeout`; attempts back off
    /// exponentially with jitter. Errors other than unavailability end the
    /// wait immediately.
    pub async fn wait_for_ready(
        &self,
        location: &Location,
        per_attempt_timeout: Duration,
        max_attempts: usize,
    ) -> ClientResult<()> {
        let transport = self.connector.connect(location)?;
        let healthcheck = Action::new(actions::HEALTHCHECK);
        let mut delay_ms = 150u64;
        let mut last_err = None;

        for attempt in 0..max_attempts {
            let err = match tokio::time::timeout(per_attempt_timeout, transport.do_action(&healthcheck)).await {
                Ok(Ok(_)) => return Ok(()),
                Ok(Err(e)) if e.is_unavailable() => e,
                Ok(Err(e)) => return Err(e),
                Err(_) => ClientError::Unavailable(format!(
                    "{location}: healthcheck timed out after {per_attempt_timeout:?}"
                )),
            };
            tracing::debug!(%location, attempt, error = %err, "server not ready");
            last_err = Some(err);
            if attempt + 1 < max_attempts {
                let jitter = rand::random::<u64>() % 50;
                tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                delay_ms = (delay_ms * 2).min(1200);
            }
        }

        Err(last_err.unwrap_or_else(|| ClientError::Unavailable(format!("{location}: not ready"))))
    }

    async fn fetch(&self, id: &ObjectId, owner: &Location) -> ClientResult<Bytes> {
        let info = self.get_flight_info(&FlightDescriptor::for_object(id), owner).await?;
        let data = self.redeem(&info, owner).await?;
        tracing::debug!(object = %id.short_hex(), %owner, bytes = data.len(), "fetched remote object");
        Ok(data)
    }
}
