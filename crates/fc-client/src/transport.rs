use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use fc_protocol::{Action, ActionType, FlightInfo, Location};
use fc_types::{FlightDescriptor, Ticket};

use crate::error::ClientResult;

/// Connection to one resolution server.
#[async_trait]
pub trait FlightTransport: Send + Sync {
    fn location(&self) -> &Location;
    async fn list_flights(&self, criteria: &[u8]) -> ClientResult<Vec<FlightInfo>>;
    async fn get_flight_info(&self, descriptor: &FlightDescriptor) -> ClientResult<FlightInfo>;
    async fn do_get(&self, ticket: &Ticket) -> ClientResult<Bytes>;
    async fn do_put(&self, descriptor: &FlightDescriptor, data: &[u8]) -> ClientResult<u64>;
    async fn do_action(&self, action: &Action) -> ClientResult<Vec<Vec<u8>>>;
    async fn list_actions(&self) -> ClientResult<Vec<ActionType>>;
}

/// Opens transports to peers by location.
pub trait Connector: Send + Sync {
    fn connect(&self, location: &Location) -> ClientResult<Arc<dyn FlightTransport>>;
}
