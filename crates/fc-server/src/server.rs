use std::net::SocketAddr;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use fc_protocol::Location;
use fc_store::SharedStore;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::service::FlightService;
use crate::shutdown::ShutdownHandle;
use crate::tls;

/// FlightCache resolution server.
pub struct FlightServer {
    config: ServerConfig,
    store: SharedStore,
}

impl FlightServer {
    pub fn new(config: ServerConfig, store: SharedStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Bind the listener and start serving in the background.
    ///
    /// The socket is bound before this returns, so `bind_addr` may use port 0.
    pub async fn spawn(self) -> ServerResult<RunningServer> {
        self.config.validate()?;
        let rustls = tls::load_rustls_config(&self.config)?;

        let listener = std::net::TcpListener::bind(self.config.bind_addr)?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        let host = self.config.advertised_host(local_addr);
        let location = match rustls {
            Some(_) => Location::for_tls(host, local_addr.port()),
            None => Location::for_tcp(host, local_addr.port()),
        };

        let shutdown = ShutdownHandle::new();
        let service = FlightService::new(self.store, location.clone(), shutdown.clone());
        let app = build_router(Arc::new(service), self.config.max_payload_size);
        let server_handle = shutdown.server_handle();

        let task = match rustls {
            Some(config) => {
                let server = axum_server::from_tcp_rustls(listener, RustlsConfig::from_config(Arc::new(config)))
                    .handle(server_handle.clone());
                tokio::spawn(async move { server.serve(app.into_make_service()).await })
            }
            None => {
                let server = axum_server::from_tcp(listener).handle(server_handle.clone());
                tokio::spawn(async move { server.serve(app.into_make_service()).await })
            }
        };
        if server_handle.listening().await.is_none() {
            return match task.await {
                Ok(Err(e)) => Err(ServerError::Io(e)),
                Ok(Ok(())) => Err(ServerError::Internal("server exited before listening".into())),
                Err(e) => Err(ServerError::Internal(e.to_string())),
            };
        }
        tracing::info!(%location, mutual_tls = self.config.verify_client, "FlightCache server listening");

        Ok(RunningServer { local_addr, location, shutdown, task })
    }

    /// Serve until a `shutdown` action (or another handle) stops the server.
    pub async fn serve(self) -> ServerResult<()> {
        self.spawn().await?.wait().await
    }
}

/// A server started by [`FlightServer::spawn`].
pub struct RunningServer {
    local_addr: SocketAddr,
    location: Location,
    shutdown: ShutdownHandle,
    task: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Location clients should use to reach this server.
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Wait for the server to stop.
    pub async fn wait(self) -> ServerResult<()> {
        let result = self
            .task
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        self.shutdown.mark_stopped();
        tracing::info!(location = %self.location, "FlightCache server stopped");
        result.map_err(ServerError::Io)
    }

    /// Stop the server and wait for it to finish.
    pub async fn shutdown(self) -> ServerResult<()> {
        self.shutdown.trigger();
        self.wait().await
    }
}
