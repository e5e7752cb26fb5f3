//! Error types for numstream servers, clients and the verifier.

use numstream_core::CoreError;
use numstream_store::StoreError;
use numstream_stream::StreamError;
use thiserror::Error;

/// Errors that can occur in numstream operations.
#[derive(Debug, Error)]
pub enum NumstreamError {
    /// Stream error.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Core error (bad identity).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The locally computed checksum differs from the server's.
    #[error("calculatedChecksum={calculated} does not match serverChecksum={server}")]
    ChecksumMismatch { calculated: String, server: String },

    /// The checksum differs from the one the caller expected.
    #[error("testChecksum={expected} does not match calculatedChecksum={calculated}")]
    UnexpectedChecksum { expected: String, calculated: String },

    /// The stream ended without a final payload.
    #[error("stream ended after {received} numbers without a checksum")]
    MissingChecksum { received: usize },

    /// A split-stream run needs a positive even count.
    #[error("for test mode specify an even number of messages, got {0}")]
    OddCount(u32),

    /// The server broke the protocol.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// Result type for numstream operations.
pub type Result<T> = std::result::Result<T, NumstreamError>;
