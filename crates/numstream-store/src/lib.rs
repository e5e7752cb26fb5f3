//! # Numstream Store
//!
//! Storage abstraction for numstream sessions. Provides a trait-based
//! interface with an in-memory implementation.
//!
//! ## Overview
//!
//! The stream engine persists a [`Session`](numstream_core::Session) snapshot
//! after every delivered number so an interrupted client can resume. The
//! store also garbage-collects idle sessions and remembers their identities
//! so they can never be resumed.
//!
//! ## Key Types
//!
//! - [`SessionStore`] - The async trait for all session operations
//! - [`MemoryStore`] - Mutex-guarded in-process storage
//! - [`Lookup`] - Atomic rejected/active/unknown resolution
//!
//! ## Usage
//!
//! ```rust,no_run
//! use numstream_core::{ClientId, Session};
//! use numstream_store::{clock, MemoryStore, SessionStore};
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     let client_id = ClientId::random();
//!
//!     let session = Session::fresh(client_id, 10, 1, clock::now());
//!     store.set(&client_id, &session).await.unwrap();
//!
//!     let resumed = store.get(&client_id).await.unwrap();
//!     assert!(resumed.is_some());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Sweep under the lock**: eviction and rejection are one step
//! - **Snapshots, not references**: stored sessions never alias live ones
//! - **Completion is not expiry**: `delete` leaves the identity usable

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, StoreConfig};
pub use traits::{Lookup, SessionStore};

/// Time source shared by the store and the stream engine.
///
/// Reads tokio's clock so tests can pause and advance time.
pub mod clock {
    use std::time::Instant;

    /// Current time.
    pub fn now() -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
