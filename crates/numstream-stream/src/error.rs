//! Error types for the stream module.

use numstream_core::ClientId;
use thiserror::Error;

use crate::messages::ErrorCode;

/// Errors that can occur while serving or consuming a stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The identity expired and cannot be reused.
    #[error("clientID {0} has expired and cannot be reused")]
    Expired(ClientId),

    /// The request was malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Frame encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] numstream_store::StoreError),

    /// Peer sent an error message.
    #[error("peer error ({code:?}): {message}")]
    Peer { code: ErrorCode, message: String },
}

impl StreamError {
    /// Wire error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            StreamError::Expired(_) => ErrorCode::Expired,
            StreamError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            StreamError::Peer { code, .. } => *code,
            StreamError::Store(numstream_store::StoreError::Rejected(_)) => ErrorCode::Expired,
            _ => ErrorCode::Internal,
        }
    }

    /// Message sent to the client for this error.
    ///
    /// Matches the wording clients already match on.
    pub fn wire_message(&self) -> String {
        match self {
            StreamError::Expired(_) | StreamError::Store(numstream_store::StoreError::Rejected(_)) => {
                "clientID has expired and cannot be reused".to_string()
            }
            StreamError::InvalidRequest(reason) => reason.clone(),
            other => other.to_string(),
        }
    }

    /// Whether retrying with the same identity could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.code(), ErrorCode::Expired | ErrorCode::InvalidRequest)
    }
}

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StreamError::Expired(ClientId::NIL).code(), ErrorCode::Expired);
        assert_eq!(
            StreamError::InvalidRequest("cannot send 0 numbers".into()).code(),
            ErrorCode::InvalidRequest
        );
        assert_eq!(
            StreamError::Transport("peer closed".into()).code(),
            ErrorCode::Internal
        );
    }

    #[test]
    fn test_retryable() {
        assert!(!StreamError::Expired(ClientId::NIL).is_retryable());
        assert!(!StreamError::InvalidRequest("x".into()).is_retryable());
        assert!(StreamError::Transport("reset".into()).is_retryable());
    }

    #[test]
    fn test_wire_messages() {
        assert_eq!(
            StreamError::Expired(ClientId::NIL).wire_message(),
            "clientID has expired and cannot be reused"
        );
        assert_eq!(
            StreamError::InvalidRequest("cannot send 0 numbers".into()).wire_message(),
            "cannot send 0 numbers"
        );
    }
}
