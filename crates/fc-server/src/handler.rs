use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};

use fc_protocol::{FlightCodec, FlightMessage, HealthResponse, ProtocolError, OCTET_STREAM};

use crate::error::ServerResult;
use crate::service::FlightService;

type AppState = State<Arc<FlightService>>;

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn list_flights_handler(State(service): AppState, body: Bytes) -> ServerResult<Response> {
    let criteria = match FlightCodec::decode_exact(&body)? {
        FlightMessage::ListFlights { criteria } => criteria,
        other => return Err(unexpected("ListFlights", &other)),
    };
    let flights = service.list_flights(&criteria).await?;
    framed(&FlightMessage::FlightList { flights })
}

pub async fn flight_info_handler(State(service): AppState, body: Bytes) -> ServerResult<Response> {
    let descriptor = match FlightCodec::decode_exact(&body)? {
        FlightMessage::GetFlightInfo { descriptor } => descriptor,
        other => return Err(unexpected("GetFlightInfo", &other)),
    };
    let info = service.get_flight_info(&descriptor).await?;
    framed(&FlightMessage::Info { info })
}

pub async fn do_get_handler(State(service): AppState, body: Bytes) -> ServerResult<Response> {
    let ticket = match FlightCodec::decode_exact(&body)? {
        FlightMessage::DoGet { ticket } => ticket,
        other => return Err(unexpected("DoGet", &other)),
    };
    let (schema, data) = service.do_get(&ticket).await?;
    framed(&FlightMessage::RecordBatch { schema, data: data.to_vec() })
}

pub async fn do_put_handler(State(service): AppState, body: Bytes) -> ServerResult<Response> {
    let (descriptor, data) = match FlightCodec::decode_exact(&body)? {
        FlightMessage::DoPut { descriptor, data } => (descriptor, data),
        other => return Err(unexpected("DoPut", &other)),
    };
    let bytes_written = service.do_put(&descriptor, &data).await?;
    framed(&FlightMessage::PutAck { bytes_written })
}

pub async fn do_action_handler(State(service): AppState, body: Bytes) -> ServerResult<Response> {
    let action = match FlightCodec::decode_exact(&body)? {
        FlightMessage::DoAction { action } => action,
        other => return Err(unexpected("DoAction", &other)),
    };
    let results = service.do_action(&action).await?;
    framed(&FlightMessage::ActionResults { results })
}

pub async fn list_actions_handler(State(service): AppState) -> ServerResult<Response> {
    let actions = service.list_actions().await;
    framed(&FlightMessage::ActionList { actions })
}

fn framed(msg: &FlightMessage) -> ServerResult<Response> {
    let body = FlightCodec::encode(msg)?;
    Ok(([(header::CONTENT_TYPE, OCTET_STREAM)], body).into_response())
}

fn unexpected(expected: &'static str, actual: &FlightMessage) -> crate::error::ServerError {
    ProtocolError::UnexpectedMessage { expected, actual: actual.type_name() }.into()
}
