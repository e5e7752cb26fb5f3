//! Error types for the store module.

use numstream_core::ClientId;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A thread panicked while holding the store lock.
    #[error("session store lock poisoned")]
    LockPoisoned,

    /// The identity expired and cannot hold a session again.
    #[error("client {0} has expired and cannot be reused")]
    Rejected(ClientId),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
