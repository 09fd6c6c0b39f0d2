use fc_protocol::{ErrorCode, ProtocolError};
use fc_store::StoreError;
use fc_types::{ObjectId, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}: {id}")]
    NotFound { message: String, id: ObjectId },

    #[error("object already exists: {0}")]
    AlreadyExists(ObjectId),

    #[error("decode error: {0}")]
    Decode(String),

    /// The peer could not be reached: connect, TLS handshake or timeout.
    #[error("peer unavailable: {0}")]
    Unavailable(String),

    /// The peer refused our credentials.
    #[error("security error: {0}")]
    Security(String),

    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("remote error ({code:?}): {message}")]
    Remote { code: ErrorCode, message: String },

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Map an error reported by a peer.
    pub fn from_remote(code: ErrorCode, message: String) -> Self {
        match code {
            ErrorCode::Unauthenticated => Self::Security(message),
            ErrorCode::UnsupportedAction => Self::UnsupportedAction(message),
            ErrorCode::Unimplemented => Self::NotImplemented(message),
            code => Self::Remote { code, message },
        }
    }

    /// Absent locally, or reported absent by a peer.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Remote { code: ErrorCode::NotFound, .. }
        )
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists(_) | Self::Remote { code: ErrorCode::AlreadyExists, .. }
        )
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<StoreError> for ClientError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound {
                message: "ObjectID not found".into(),
                id,
            },
            StoreError::AlreadyExists(id) => Self::AlreadyExists(id),
            other => Self::Store(other),
        }
    }
}

impl From<ProtocolError> for ClientError {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::InvalidLocation { .. } => Self::InvalidLocation(e.to_string()),
            other => Self::Decode(other.to_string()),
        }
    }
}

impl From<TypeError> for ClientError {
    fn from(e: TypeError) -> Self {
        Self::Decode(e.to_string())
    }
}
