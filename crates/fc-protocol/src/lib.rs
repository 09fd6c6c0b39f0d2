//! Wire protocol for FlightCache.
//!
//! Defines the flight metadata advertised by a resolution server, the
//! request/response messages exchanged with it, their framing, and how peers
//! are addressed and secured.

pub mod auth;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod location;
pub mod message;

pub use auth::{ClientTlsConfig, TlsIdentity};
pub use codec::FlightCodec;
pub use endpoint::{endpoints, HealthResponse, OCTET_STREAM};
pub use error::{ProtocolError, ProtocolResult};
pub use location::{Location, Scheme};
pub use message::{
    actions, Action, ActionType, DataType, ErrorCode, Field, FlightEndpoint, FlightInfo,
    FlightMessage, FlightPayload, FlightSchema, MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
};
