use std::time::Duration;

use bytes::Bytes;
use fc_protocol::{actions, Action, ActionType, FlightInfo, FlightPayload, FlightSchema, Location};
use fc_store::SharedStore;
use fc_types::{DescriptorKind, FlightDescriptor, FlightKey, Ticket};

use crate::error::{ServerError, ServerResult};
use crate::shutdown::ShutdownHandle;

/// Delay between acknowledging `shutdown` and stopping the listener, so the
/// acknowledgment reaches the caller first.
const SHUTDOWN_DELAY: Duration = Duration::from_millis(50);

/// Flight operations over a local store, independent of the transport.
pub struct FlightService {
    store: SharedStore,
    location: Location,
    shutdown: ShutdownHandle,
}

impl FlightService {
    pub fn new(store: SharedStore, location: Location, shutdown: ShutdownHandle) -> Self {
        Self { store, location, shutdown }
    }

    /// Location advertised in every endpoint this service hands out.
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// One flight per sealed object. Criteria are accepted but not applied.
    pub async fn list_flights(&self, _criteria: &[u8]) -> ServerResult<Vec<FlightInfo>> {
        let listing = self.store.list()?;
        Ok(listing
            .into_iter()
            .map(|(id, meta)| {
                FlightPayload::RawObject { size: meta.data_size }.render(
                    &FlightKey::for_object(&id),
                    FlightDescriptor::for_object(&id),
                    self.location.clone(),
                )
            })
            .collect())
    }

    pub async fn get_flight_info(&self, descriptor: &FlightDescriptor) -> ServerResult<FlightInfo> {
        let key = FlightKey::from_descriptor(descriptor);
        let id = key.object_id()?;
        let data = self
            .store
            .get_buffers(&[id])?
            .pop()
            .flatten()
            .ok_or_else(|| ServerError::NotFound(descriptor.to_string()))?;
        Ok(FlightPayload::RawObject { size: data.len() as u64 }.render(
            &key,
            descriptor.clone(),
            self.location.clone(),
        ))
    }

    /// Store an uploaded payload under the object named by `descriptor`.
    pub async fn do_put(&self, descriptor: &FlightDescriptor, data: &[u8]) -> ServerResult<u64> {
        let key = FlightKey::from_descriptor(descriptor);
        if key.kind != DescriptorKind::Path {
            return Err(ServerError::InvalidRequest(format!(
                "put requires a path descriptor, got {descriptor}"
            )));
        }
        let id = key.object_id()?;
        self.store.put_raw(id, data)?;
        tracing::info!(object = %id.short_hex(), bytes = data.len(), "stored uploaded flight");
        Ok(data.len() as u64)
    }

    /// Redeem a ticket for the whole object as one opaque record.
    pub async fn do_get(&self, ticket: &Ticket) -> ServerResult<(FlightSchema, Bytes)> {
        let key = ticket.decode()?;
        let id = key.object_id()?;
        let data = self
            .store
            .get_buffers(&[id])?
            .pop()
            .flatten()
            .ok_or_else(|| ServerError::NotFound(id.to_hex()))?;
        tracing::debug!(object = %id.short_hex(), bytes = data.len(), "serving flight");
        Ok((FlightSchema::opaque_binary(data.len() as u64), data))
    }

    pub async fn do_action(&self, action: &Action) -> ServerResult<Vec<Vec<u8>>> {
        match action.kind.as_str() {
            actions::HEALTHCHECK => Ok(Vec::new()),
            actions::SHUTDOWN => {
                let handle = self.shutdown.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(SHUTDOWN_DELAY).await;
                    handle.trigger();
                });
                Ok(vec![actions::SHUTDOWN_ACK.to_vec()])
            }
            actions::CLEAR => Err(ServerError::NotImplemented(action.kind.clone())),
            other => Err(ServerError::UnsupportedAction(other.to_string())),
        }
    }

    pub async fn list_actions(&self) -> Vec<ActionType> {
        vec![
            ActionType {
                kind: actions::CLEAR.into(),
                description: "Clear the stored flights.".into(),
            },
            ActionType {
                kind: actions::HEALTHCHECK.into(),
                description: "Report whether the server is serving.".into(),
            },
            ActionType {
                kind: actions::SHUTDOWN.into(),
                description: "Shut down this server.".into(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shutdown::ServerState;
    use fc_protocol::DataType;
    use fc_store::{InMemoryObjectStore, ObjectStore};
    use fc_types::ObjectId;
    use std::sync::Arc;

    fn service() -> (FlightService, Arc<InMemoryObjectStore>) {
        let store = Arc::new(InMemoryObjectStore::new());
        let service = FlightService::new(
            store.clone(),
            Location::for_tcp("localhost", 5005),
            ShutdownHandle::new(),
        );
        (service, store)
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let (service, _) = service();
        assert!(service.list_flights(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_has_one_entry_per_object() {
        let (service, store) = service();
        for name in ["a", "b", "c"] {
            store.put_raw(ObjectId::generate(name.as_bytes()), name.as_bytes()).unwrap();
        }
        let flights = service.list_flights(b"ignored").await.unwrap();
        assert_eq!(flights.len(), 3);
        for info in &flights {
            assert_eq!(info.total_records, 1);
            assert_eq!(info.total_bytes, 1);
            assert_eq!(info.endpoints[0].locations[0], *service.location());
            let key = info.endpoints[0].ticket.decode().unwrap();
            assert!(store.contains(&key.object_id().unwrap()).unwrap());
        }
    }

    #[tokio::test]
    async fn get_flight_info_describes_object() {
        let (service, store) = service();
        let id = ObjectId::generate(b"Hello World!");
        store.put_raw(id, b"Hello World!").unwrap();
        let info = service
            .get_flight_info(&FlightDescriptor::for_object(&id))
            .await
            .unwrap();
        assert_eq!(info.total_bytes, 12);
        assert_eq!(info.schema.fields[0].data_type, DataType::FixedSizeBinary(12));
        assert_eq!(info.descriptor, FlightDescriptor::for_object(&id));
    }

    #[tokio::test]
    async fn get_flight_info_missing_is_not_found() {
        let (service, _) = service();
        let id = ObjectId::generate(b"absent");
        let err = service
            .get_flight_info(&FlightDescriptor::for_object(&id))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn command_descriptor_is_rejected() {
        let (service, _) = service();
        let err = service
            .get_flight_info(&FlightDescriptor::for_command("SELECT 1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Decode(_)));
        let err = service
            .do_put(&FlightDescriptor::for_command("x"), b"data")
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let (service, _) = service();
        let id = ObjectId::generate("你好".as_bytes());
        let written = service
            .do_put(&FlightDescriptor::for_object(&id), "你好".as_bytes())
            .await
            .unwrap();
        assert_eq!(written, 6);

        let ticket = Ticket::encode(&FlightKey::for_object(&id));
        let (schema, data) = service.do_get(&ticket).await.unwrap();
        assert_eq!(schema, FlightSchema::opaque_binary(6));
        assert_eq!(data.as_ref(), "你好".as_bytes());
    }

    #[tokio::test]
    async fn duplicate_put_keeps_first_value() {
        let (service, store) = service();
        let id = ObjectId::generate(b"once");
        let descriptor = FlightDescriptor::for_object(&id);
        service.do_put(&descriptor, b"first").await.unwrap();
        let err = service.do_put(&descriptor, b"second").await.unwrap_err();
        assert!(matches!(err, ServerError::Store(fc_store::StoreError::AlreadyExists(_))));
        assert_eq!(store.get(&id).unwrap().as_ref(), b"first");
    }

    #[tokio::test]
    async fn malformed_ticket_is_rejected() {
        let (service, _) = service();
        let err = service.do_get(&Ticket::from_bytes(b"garbage".to_vec())).await.unwrap_err();
        assert!(matches!(err, ServerError::Decode(_)));
    }

    #[tokio::test]
    async fn action_vocabulary() {
        let (service, _) = service();
        assert!(service.do_action(&Action::new("healthcheck")).await.unwrap().is_empty());
        assert!(matches!(
            service.do_action(&Action::new("clear")).await,
            Err(ServerError::NotImplemented(_))
        ));
        assert!(matches!(
            service.do_action(&Action::new("reboot")).await,
            Err(ServerError::UnsupportedAction(name)) if name == "reboot"
        ));
        let kinds: Vec<String> = service.list_actions().await.into_iter().map(|a| a.kind).collect();
        assert_eq!(kinds, ["clear", "healthcheck", "shutdown"]);
    }

    #[tokio::test]
    async fn shutdown_acknowledges_then_stops() {
        let store = Arc::new(InMemoryObjectStore::new());
        let handle = ShutdownHandle::new();
        let service = FlightService::new(store, Location::for_tcp("h", 1), handle.clone());
        let results = service.do_action(&Action::new("shutdown")).await.unwrap();
        assert_eq!(results, vec![b"Shutdown!".to_vec()]);
        assert_eq!(handle.state(), ServerState::Serving);
        tokio::time::sleep(SHUTDOWN_DELAY * 4).await;
        assert_eq!(handle.state(), ServerState::ShuttingDown);
    }
}
