//! Client against real resolution servers on loopback.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fc_protocol::{actions, ClientTlsConfig, Location, TlsIdentity};
use fc_server::{FlightServer, RunningServer, ServerConfig, ServerState, TlsConfig};
use fc_store::{InMemoryObjectStore, SharedStore};
use fc_types::ObjectId;

use crate::{ClientConfig, ClientError, ResolutionClient};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn read_fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture(name)).unwrap()
}

fn loopback() -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        ..Default::default()
    }
}

fn tls_config(verify_client: bool) -> ServerConfig {
    ServerConfig {
        tls: Some(TlsConfig {
            cert_path: fixture("server.pem"),
            key_path: fixture("server-key.pem"),
        }),
        verify_client,
        client_ca_path: verify_client.then(|| fixture("ca.pem")),
        ..loopback()
    }
}

async fn start(config: ServerConfig) -> (RunningServer, SharedStore) {
    let store: SharedStore = Arc::new(InMemoryObjectStore::new());
    let running = FlightServer::new(config, store.clone()).spawn().await.unwrap();
    (running, store)
}

fn client(config: ClientConfig) -> ResolutionClient {
    ResolutionClient::new(Arc::new(InMemoryObjectStore::new()), config).unwrap()
}

#[tokio::test]
async fn two_nodes_sync_and_cache() {
    let (server, server_store) = start(loopback()).await;
    let owner = server.location().to_string();
    let id = ObjectId::generate(b"2x2x2");
    let tensor: Vec<u8> = (0u8..8).flat_map(|v| f64::from(v).to_le_bytes()).collect();
    server_store.put_raw(id, &tensor).unwrap();

    let reader = client(ClientConfig::default());
    reader
        .wait_for_ready(server.location(), Duration::from_millis(500), 5)
        .await
        .unwrap();
    assert!(reader.exists(&id, Some(&owner)).await.unwrap());
    assert_eq!(reader.get(&id, Some(&owner)).await.unwrap().as_ref(), tensor.as_slice());
    assert!(reader.store().contains(&id).unwrap());

    let ack = reader.do_action(server.location(), actions::SHUTDOWN).await.unwrap();
    assert_eq!(ack, vec![actions::SHUTDOWN_ACK.to_vec()]);
    let handle = server.shutdown_handle();
    tokio::time::timeout(Duration::from_secs(5), server.wait())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(handle.state(), ServerState::Stopped);

    // Served from the local cache with the owner gone.
    assert_eq!(reader.get(&id, Some(&owner)).await.unwrap().as_ref(), tensor.as_slice());
    // A remote-only probe now fails softly.
    assert!(!reader.exists(&ObjectId::generate(b"other"), Some(&owner)).await.unwrap());
}

#[tokio::test]
async fn listing_tracks_store() {
    let (server, store) = start(loopback()).await;
    let reader = client(ClientConfig::default());
    assert!(reader.list_flights(server.location()).await.unwrap().is_empty());

    for text in ["Hello World!", "你好", "third"] {
        store.put_raw(ObjectId::generate(text.as_bytes()), text.as_bytes()).unwrap();
    }
    let flights = reader.list_flights(server.location()).await.unwrap();
    assert_eq!(flights.len(), 3);
    assert!(flights
        .iter()
        .all(|f| f.endpoints[0].locations == vec![server.location().clone()]));

    let kinds: Vec<String> = reader
        .list_actions(server.location())
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.kind)
        .collect();
    assert_eq!(kinds, ["clear", "healthcheck", "shutdown"]);
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn push_is_write_once_remotely() {
    let (server, store) = start(loopback()).await;
    let writer = client(ClientConfig::default());
    let id = ObjectId::generate(b"pushed");
    writer.put(b"first", id).await.unwrap();
    assert_eq!(writer.push(&id, server.location()).await.unwrap(), 5);

    let err = writer.push(&id, server.location()).await.unwrap_err();
    assert!(err.is_already_exists(), "{err}");
    assert_eq!(store.get(&id).unwrap().as_ref(), b"first");
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_and_unimplemented_actions() {
    let (server, _) = start(loopback()).await;
    let c = client(ClientConfig::default());
    assert!(matches!(
        c.do_action(server.location(), "dance").await,
        Err(ClientError::UnsupportedAction(_))
    ));
    assert!(matches!(
        c.do_action(server.location(), actions::CLEAR).await,
        Err(ClientError::NotImplemented(_))
    ));
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_object_on_owner() {
    let (server, _) = start(loopback()).await;
    let c = client(ClientConfig::default());
    let owner = server.location().to_string();
    let err = c.get(&ObjectId::generate(b"absent"), Some(&owner)).await.unwrap_err();
    assert!(err.is_not_found(), "{err}");
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn tls_requires_trusted_root() {
    let (server, store) = start(tls_config(false)).await;
    assert!(server.location().is_tls());
    let id = ObjectId::generate(b"secret");
    store.put_raw(id, b"over tls").unwrap();
    let owner = server.location().to_string();

    let untrusting = client(ClientConfig::default().with_request_timeout(Duration::from_secs(5)));
    let err = untrusting.get(&id, Some(&owner)).await.unwrap_err();
    assert!(err.is_unavailable(), "{err}");

    let trusting = client(
        ClientConfig::default().with_tls(ClientTlsConfig::default().with_root(read_fixture("ca.pem"))),
    );
    assert_eq!(trusting.get(&id, Some(&owner)).await.unwrap().as_ref(), b"over tls");
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn mutual_tls_requires_client_certificate() {
    let (server, store) = start(tls_config(true)).await;
    let id = ObjectId::generate(b"mutual");
    store.put_raw(id, b"over mtls").unwrap();
    let owner = server.location().to_string();
    let root = ClientTlsConfig::default().with_root(read_fixture("ca.pem"));

    let anonymous = client(ClientConfig::default().with_tls(root.clone()));
    let err = anonymous.get(&id, Some(&owner)).await.unwrap_err();
    assert!(err.is_unavailable(), "{err}");

    // A server certificate is not valid for client authentication.
    let wrong = client(ClientConfig::default().with_tls(root.clone().with_identity(
        TlsIdentity::new(read_fixture("server.pem"), read_fixture("server-key.pem")),
    )));
    let err = wrong.get(&id, Some(&owner)).await.unwrap_err();
    assert!(err.is_unavailable(), "{err}");

    let authenticated = client(ClientConfig::default().with_tls(root.with_identity(
        TlsIdentity::from_files(&fixture("client.pem"), &fixture("client-key.pem")).unwrap(),
    )));
    assert_eq!(authenticated.get(&id, Some(&owner)).await.unwrap().as_ref(), b"over mtls");
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn repeated_shutdown_is_harmless() {
    let (server, _) = start(loopback()).await;
    let location: Location = server.location().clone();
    let c = client(ClientConfig::default());
    c.do_action(&location, actions::SHUTDOWN).await.unwrap();
    // The listener may already be closing; either outcome is fine as long as
    // nothing panics and the server stops.
    let _ = c.do_action(&location, actions::SHUTDOWN).await;
    tokio::time::timeout(Duration::from_secs(5), server.wait())
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn misadvertised_owner_still_serves_its_objects() {
    let config = ServerConfig { host: Some("unreachable.invalid".into()), ..loopback() };
    let (server, store) = start(config).await;
    let id = ObjectId::generate(b"misadvertised");
    store.put_raw(id, b"still here").unwrap();
    let owner = format!("grpc+tcp://{}", server.local_addr());

    let reader = client(ClientConfig::default());
    assert!(reader.exists(&id, Some(&owner)).await.unwrap());
    assert_eq!(reader.get(&id, Some(&owner)).await.unwrap().as_ref(), b"still here");
    server.shutdown().await.unwrap();
}
