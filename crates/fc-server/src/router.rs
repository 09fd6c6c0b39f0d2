use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use fc_protocol::endpoints;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::service::FlightService;

/// Build the axum router with all FlightCache endpoints.
///
/// Request bodies larger than `max_payload_size` are refused with 413.
pub fn build_router(service: Arc<FlightService>, max_payload_size: usize) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(endpoints::LIST_FLIGHTS, post(handler::list_flights_handler))
        .route(endpoints::FLIGHT_INFO, post(handler::flight_info_handler))
        .route(endpoints::DO_GET, post(handler::do_get_handler))
        .route(endpoints::DO_PUT, post(handler::do_put_handler))
        .route(endpoints::DO_ACTION, post(handler::do_action_handler))
        .route(endpoints::LIST_ACTIONS, post(handler::list_actions_handler))
        .layer(DefaultBodyLimit::max(max_payload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
