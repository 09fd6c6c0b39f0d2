//! Resolution server for FlightCache.
//!
//! Presents the contents of a local object store as a set of named,
//! fetchable flights, accepts inbound puts into that store, and answers the
//! `healthcheck` and `shutdown` control actions. Served over HTTP, optionally
//! behind TLS or mutual TLS.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod service;
pub mod shutdown;
pub mod tls;

pub use config::{ServerConfig, TlsConfig};
pub use error::{ServerError, ServerResult};
pub use server::{FlightServer, RunningServer};
pub use service::FlightService;
pub use shutdown::{ServerState, ShutdownHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use fc_protocol::{HealthResponse, Location, PROTOCOL_VERSION};
    use fc_store::InMemoryObjectStore;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn app() -> axum::Router {
        let service = FlightService::new(
            Arc::new(InMemoryObjectStore::new()),
            Location::for_tcp("localhost", 5005),
            ShutdownHandle::new(),
        );
        router::build_router(Arc::new(service), 1024 * 1024)
    }

    #[tokio::test]
    async fn health_reports_protocol_version() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.protocol_version, PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn only_flight_routes_are_served() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/v1/info")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
