use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use fc_protocol::{ErrorCode, FlightCodec, FlightMessage, OCTET_STREAM};
use fc_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("flight not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid flight key: {0}")]
    Decode(#[from] fc_types::TypeError),

    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("{0} is not implemented.")]
    NotImplemented(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] fc_protocol::ProtocolError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// Wire category reported to the caller.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::InvalidRequest(_) | Self::Decode(_) | Self::Protocol(_) => {
                ErrorCode::InvalidArgument
            }
            Self::UnsupportedAction(_) => ErrorCode::UnsupportedAction,
            Self::NotImplemented(_) => ErrorCode::Unimplemented,
            Self::Store(e) => match e {
                StoreError::NotFound(_) => ErrorCode::NotFound,
                StoreError::AlreadyExists(_) => ErrorCode::AlreadyExists,
                StoreError::CapacityExceeded { .. } => ErrorCode::ResourceExhausted,
                StoreError::Overflow { .. } => ErrorCode::InvalidArgument,
                StoreError::NotPending(_) => ErrorCode::Internal,
            },
            Self::Tls(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                ErrorCode::Internal
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if code == ErrorCode::Internal {
            tracing::warn!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let message = FlightMessage::Error { code, message: self.to_string() };
        match FlightCodec::encode(&message) {
            Ok(body) => (status, [(header::CONTENT_TYPE, OCTET_STREAM)], body).into_response(),
            Err(_) => (status, self.to_string()).into_response(),
        }
    }
}
