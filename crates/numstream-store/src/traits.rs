//! SessionStore trait: the abstract interface for session persistence.
//!
//! The stream engine only talks to this trait. Implementations must
//! serialize every operation, garbage collection included, under a single
//! discipline so that an eviction and the matching rejection are always
//! observed together.

use async_trait::async_trait;
use numstream_core::{ClientId, Session};

use crate::error::Result;

/// What the store knows about an identity, resolved after a sweep.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// The identity expired and is permanently barred.
    Rejected,
    /// A live session exists; this is a private copy of it.
    Active(Session),
    /// Nothing is stored for this identity.
    Unknown,
}

impl Lookup {
    /// Check if the identity is rejected.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Lookup::Rejected)
    }

    /// Take the session out of an `Active` lookup.
    pub fn into_session(self) -> Option<Session> {
        match self {
            Lookup::Active(session) => Some(session),
            _ => None,
        }
    }
}

/// The SessionStore trait: async interface for session persistence.
///
/// # Design Notes
///
/// - **Sweep first**: `is_rejected`, `get`, `lookup` and `set` run garbage
///   collection before answering, so staleness is visible immediately.
/// - **Copy semantics**: `set` stores a snapshot and `get` returns one.
///   Neither side can mutate the other's copy.
/// - **Rejection is permanent**: an evicted identity never holds a session
///   again. `delete` does not reject.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Whether `client_id` is in the rejection set.
    async fn is_rejected(&self, client_id: &ClientId) -> Result<bool>;

    /// Get a copy of the live session for `client_id`, if any.
    async fn get(&self, client_id: &ClientId) -> Result<Option<Session>>;

    /// Resolve `client_id` against the rejection set and the live sessions
    /// in a single step.
    ///
    /// An `Active` result counts as activity: the stored session's
    /// `last_touched` is refreshed before the copy is taken.
    async fn lookup(&self, client_id: &ClientId) -> Result<Lookup>;

    /// Store a snapshot of `session` under `client_id`.
    ///
    /// Fails with [`StoreError::Rejected`](crate::StoreError::Rejected) if the
    /// identity has expired.
    async fn set(&self, client_id: &ClientId, session: &Session) -> Result<()>;

    /// Remove the session for `client_id` after successful completion.
    async fn delete(&self, client_id: &ClientId) -> Result<()>;

    /// Run garbage collection, returning the identities it rejected.
    async fn sweep(&self) -> Result<Vec<ClientId>>;

    /// Number of live sessions.
    async fn active_count(&self) -> Result<usize>;

    /// Number of rejected identities.
    async fn rejected_count(&self) -> Result<usize>;
}
