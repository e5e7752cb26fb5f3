//! Wire message types.
//!
//! A client sends one [`NumbersRequest`]; the server answers with a stream of
//! [`NumberResponse`]s, the last of which carries the checksum.

use serde::{Deserialize, Serialize};

use numstream_core::{ClientId, CoreError};

/// Message size limits.
pub mod limits {
    /// Max encoded frame body in bytes.
    pub const MAX_FRAME_LEN: usize = 64 * 1024;
    /// Max raw client id length accepted before validation.
    pub const MAX_CLIENT_ID_LEN: usize = 64;
    /// Max checksum string length (hex MD5 is 32).
    pub const MAX_CHECKSUM_LEN: usize = 64;
    /// Max error message length.
    pub const MAX_ERROR_MESSAGE_LEN: usize = 1024;
}

/// Request to start or resume a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumbersRequest {
    /// Caller identity; must be exactly 16 bytes.
    pub client_id: Vec<u8>,
    /// Numbers wanted. Ignored when resuming.
    pub requested_count: u32,
    /// Generator seed. Zero means "resume" or "choose for me".
    pub seed: u32,
}

impl NumbersRequest {
    /// Build a request for `client_id`.
    pub fn new(client_id: ClientId, requested_count: u32, seed: u32) -> Self {
        Self {
            client_id: client_id.as_bytes().to_vec(),
            requested_count,
            seed,
        }
    }

    /// Parse the raw identity.
    pub fn client_id(&self) -> Result<ClientId, CoreError> {
        ClientId::try_from(self.client_id.as_slice())
    }
}

/// One delivered number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberResponse {
    /// The number.
    pub number: u32,
    /// Empty except on the final response, where it holds the hex MD5.
    pub checksum: String,
}

impl NumberResponse {
    /// A non-final response.
    pub fn partial(number: u32) -> Self {
        Self {
            number,
            checksum: String::new(),
        }
    }

    /// The final response of a sequence.
    pub fn last(number: u32, checksum: String) -> Self {
        Self { number, checksum }
    }

    /// Whether this response ends the stream.
    pub fn is_final(&self) -> bool {
        !self.checksum.is_empty()
    }
}

/// Frame envelope on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamMessage {
    /// Client to server: open a stream.
    Request(NumbersRequest),

    /// Server to client: one number.
    Number(NumberResponse),

    /// Server to client: the request failed.
    Error {
        /// Error code for programmatic handling.
        code: ErrorCode,
        /// Human-readable description.
        message: String,
    },
}

impl StreamMessage {
    /// Check if this message respects size limits.
    pub fn validate_limits(&self) -> Result<(), &'static str> {
        match self {
            StreamMessage::Request(request) => {
                if request.client_id.len() > limits::MAX_CLIENT_ID_LEN {
                    return Err("client id too long");
                }
            }
            StreamMessage::Number(response) => {
                if response.checksum.len() > limits::MAX_CHECKSUM_LEN {
                    return Err("checksum too long");
                }
            }
            StreamMessage::Error { message, .. } => {
                if message.len() > limits::MAX_ERROR_MESSAGE_LEN {
                    return Err("error message too long");
                }
            }
        }
        Ok(())
    }
}

/// Error codes carried by [`StreamMessage::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum ErrorCode {
    /// Unknown/unspecified error.
    Unknown = 0,
    /// The client id expired and cannot be reused.
    Expired = 1,
    /// The request was malformed (zero count, bad id).
    InvalidRequest = 2,
    /// Internal error on the server.
    Internal = 3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_client_id() {
        let id = ClientId::from_bytes([7; 16]);
        let request = NumbersRequest::new(id, 10, 1);
        assert_eq!(request.client_id().unwrap(), id);

        let bad = NumbersRequest {
            client_id: vec![1, 2, 3],
            requested_count: 10,
            seed: 1,
        };
        assert!(bad.client_id().is_err());
    }

    #[test]
    fn test_response_finality() {
        assert!(!NumberResponse::partial(5).is_final());
        assert!(NumberResponse::last(5, "abc".into()).is_final());
    }

    #[test]
    fn test_message_limits_valid() {
        let msg = StreamMessage::Request(NumbersRequest::new(ClientId::NIL, 1, 0));
        assert!(msg.validate_limits().is_ok());
    }

    #[test]
    fn test_message_limits_exceeded() {
        let msg = StreamMessage::Request(NumbersRequest {
            client_id: vec![0u8; 200],
            requested_count: 1,
            seed: 0,
        });
        assert!(msg.validate_limits().is_err());

        let msg = StreamMessage::Error {
            code: ErrorCode::Internal,
            message: "x".repeat(2000),
        };
        assert!(msg.validate_limits().is_err());
    }
}
