//! Error types for numstream core.

use thiserror::Error;

/// Errors that can occur while building core values from untrusted input.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("client id must be 16 bytes, got {len}")]
    InvalidClientId { len: usize },

    #[error("invalid client uuid: {0}")]
    InvalidUuid(String),
}
