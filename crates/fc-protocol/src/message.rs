use fc_types::{FlightDescriptor, FlightKey, Ticket};
use serde::{Deserialize, Serialize};

use crate::location::Location;

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_MESSAGE_SIZE: usize = 256 * 1024 * 1024;

/// Column type advertised in a flight schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// Opaque binary of a fixed width in bytes.
    FixedSizeBinary(u64),
    Binary,
    Utf8,
    Int64,
    Float64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self { name: name.into(), data_type }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightSchema {
    pub fields: Vec<Field>,
}

impl FlightSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// The single opaque column used for objects of unknown type.
    pub fn opaque_binary(width: u64) -> Self {
        Self::new(vec![Field::new("data", DataType::FixedSizeBinary(width))])
    }
}

impl std::fmt::Display for FlightSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match &field.data_type {
                DataType::FixedSizeBinary(w) => write!(f, "{}: fixed_size_binary[{w}]", field.name)?,
                DataType::Binary => write!(f, "{}: binary", field.name)?,
                DataType::Utf8 => write!(f, "{}: string", field.name)?,
                DataType::Int64 => write!(f, "{}: int64", field.name)?,
                DataType::Float64 => write!(f, "{}: double", field.name)?,
            }
        }
        Ok(())
    }
}

/// Where and how to redeem a flight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightEndpoint {
    pub ticket: Ticket,
    pub locations: Vec<Location>,
}

/// Metadata of one fetchable flight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightInfo {
    pub schema: FlightSchema,
    pub descriptor: FlightDescriptor,
    pub endpoints: Vec<FlightEndpoint>,
    /// Record count, `-1` when unknown.
    pub total_records: i64,
    /// Byte length, `-1` when unknown.
    pub total_bytes: i64,
}

/// What a flight carries, as far as the advertising server knows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlightPayload {
    /// Raw store object of unknown type; the reader decides how to decode it.
    RawObject { size: u64 },
    /// A payload whose schema and row count are known.
    DescribedTable { schema: FlightSchema, row_count: u64, byte_len: u64 },
}

impl FlightPayload {
    /// Build the flight info advertised for this payload, with a single
    /// endpoint redeemable at `location`.
    pub fn render(&self, key: &FlightKey, descriptor: FlightDescriptor, location: Location) -> FlightInfo {
        let endpoint = FlightEndpoint {
            ticket: Ticket::encode(key),
            locations: vec![location],
        };
        match self {
            Self::RawObject { size } => render_raw_object(*size, descriptor, endpoint),
            Self::DescribedTable { schema, row_count, byte_len } => {
                render_table(schema, *row_count, *byte_len, descriptor, endpoint)
            }
        }
    }
}

fn render_raw_object(size: u64, descriptor: FlightDescriptor, endpoint: FlightEndpoint) -> FlightInfo {
    FlightInfo {
        schema: FlightSchema::opaque_binary(size),
        descriptor,
        endpoints: vec![endpoint],
        total_records: 1,
        total_bytes: size as i64,
    }
}

fn render_table(
    schema: &FlightSchema,
    row_count: u64,
    byte_len: u64,
    descriptor: FlightDescriptor,
    endpoint: FlightEndpoint,
) -> FlightInfo {
    FlightInfo {
        schema: schema.clone(),
        descriptor,
        endpoints: vec![endpoint],
        total_records: row_count as i64,
        total_bytes: byte_len as i64,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: String,
    pub body: Vec<u8>,
}

impl Action {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), body: Vec::new() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionType {
    pub kind: String,
    pub description: String,
}

/// Error category carried by [`FlightMessage::Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    UnsupportedAction,
    Unimplemented,
    Unauthenticated,
    ResourceExhausted,
    Internal,
}

impl ErrorCode {
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::InvalidArgument => 400,
            Self::UnsupportedAction => 422,
            Self::Unimplemented => 501,
            Self::Unauthenticated => 401,
            Self::ResourceExhausted => 507,
            Self::Internal => 500,
        }
    }

    /// Best-effort category for a status that arrived without a framed error.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            409 => Self::AlreadyExists,
            400 | 413 => Self::InvalidArgument,
            422 => Self::UnsupportedAction,
            501 => Self::Unimplemented,
            401 | 403 => Self::Unauthenticated,
            507 => Self::ResourceExhausted,
            _ => Self::Internal,
        }
    }
}

/// All message types in the FlightCache protocol.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FlightMessage {
    ListFlights { criteria: Vec<u8> },
    FlightList { flights: Vec<FlightInfo> },
    GetFlightInfo { descriptor: FlightDescriptor },
    Info { info: FlightInfo },
    DoGet { ticket: Ticket },
    RecordBatch { schema: FlightSchema, data: Vec<u8> },
    DoPut { descriptor: FlightDescriptor, data: Vec<u8> },
    PutAck { bytes_written: u64 },
    DoAction { action: Action },
    ActionResults { results: Vec<Vec<u8>> },
    ListActions,
    ActionList { actions: Vec<ActionType> },
    Error { code: ErrorCode, message: String },
}

impl FlightMessage {
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::ListFlights { .. } => 1,
            Self::FlightList { .. } => 2,
            Self::GetFlightInfo { .. } => 3,
            Self::Info { .. } => 4,
            Self::DoGet { .. } => 5,
            Self::RecordBatch { .. } => 6,
            Self::DoPut { .. } => 7,
            Self::PutAck { .. } => 8,
            Self::DoAction { .. } => 9,
            Self::ActionResults { .. } => 10,
            Self::ListActions => 11,
            Self::ActionList { .. } => 12,
            Self::Error { .. } => 255,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ListFlights { .. } => "ListFlights",
            Self::FlightList { .. } => "FlightList",
            Self::GetFlightInfo { .. } => "GetFlightInfo",
            Self::Info { .. } => "Info",
            Self::DoGet { .. } => "DoGet",
            Self::RecordBatch { .. } => "RecordBatch",
            Self::DoPut { .. } => "DoPut",
            Self::PutAck { .. } => "PutAck",
            Self::DoAction { .. } => "DoAction",
            Self::ActionResults { .. } => "ActionResults",
            Self::ListActions => "ListActions",
            Self::ActionList { .. } => "ActionList",
            Self::Error { .. } => "Error",
        }
    }
}

/// Action vocabulary understood by resolution servers.
pub mod actions {
    pub const HEALTHCHECK: &str = "healthcheck";
    pub const SHUTDOWN: &str = "shutdown";
    pub const CLEAR: &str = "clear";

    /// Body of the acknowledgment returned by `shutdown`.
    pub const SHUTDOWN_ACK: &[u8] = b"Shutdown!";
}
