//! In-memory implementation of the SessionStore trait.
//!
//! Sessions live only as long as the process. One mutex guards both the
//! live sessions and the rejection set, and every operation holds it from
//! the sweep through to its own read or write.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use numstream_core::limits::INACTIVITY_TIMEOUT;
use numstream_core::{ClientId, Session};

use crate::clock;
use crate::error::{Result, StoreError};
use crate::traits::{Lookup, SessionStore};

/// Configuration for the memory store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Idle time after which a session is evicted and its identity rejected.
    pub inactivity_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: INACTIVITY_TIMEOUT,
        }
    }
}

/// In-memory session store.
pub struct MemoryStore {
    config: StoreConfig,
    inner: Mutex<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Live sessions by identity.
    sessions: HashMap<ClientId, Session>,

    /// Identities evicted for inactivity.
    rejected: HashSet<ClientId>,
}

impl MemoryStoreInner {
    /// Move every session idle past `timeout` into the rejection set.
    ///
    /// Caller holds the store lock, so removal and rejection land together.
    fn sweep(&mut self, now: Instant, timeout: Duration) -> Vec<ClientId> {
        let expired: Vec<ClientId> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.is_expired(now, timeout))
            .map(|(client_id, _)| *client_id)
            .collect();

        for client_id in &expired {
            if let Some(session) = self.sessions.remove(client_id) {
                tracing::debug!(
                    client_id = %client_id,
                    sent = session.sent_count,
                    total = session.total_count,
                    "evicted idle session"
                );
            }
            self.rejected.insert(*client_id);
        }

        if !expired.is_empty() {
            tracing::info!(
                evicted = expired.len(),
                active = self.sessions.len(),
                "session sweep rejected idle clients"
            );
        }

        expired
    }
}

impl MemoryStore {
    /// Create a new empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a new empty store.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(MemoryStoreInner::default()),
        }
    }

    /// The store's configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryStoreInner>> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Lock the store and sweep before handing the guard out.
    fn lock_swept(&self) -> Result<MutexGuard<'_, MemoryStoreInner>> {
        let mut inner = self.lock()?;
        inner.sweep(clock::now(), self.config.inactivity_timeout);
        Ok(inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn is_rejected(&self, client_id: &ClientId) -> Result<bool> {
        let inner = self.lock_swept()?;
        Ok(inner.rejected.contains(client_id))
    }

    async fn get(&self, client_id: &ClientId) -> Result<Option<Session>> {
        let inner = self.lock_swept()?;
        Ok(inner.sessions.get(client_id).cloned())
    }

    async fn lookup(&self, client_id: &ClientId) -> Result<Lookup> {
        let now = clock::now();
        let mut inner = self.lock()?;
        inner.sweep(now, self.config.inactivity_timeout);

        if inner.rejected.contains(client_id) {
            return Ok(Lookup::Rejected);
        }

        Ok(match inner.sessions.get_mut(client_id) {
            Some(session) => {
                session.touch(now);
                Lookup::Active(session.clone())
            }
            None => Lookup::Unknown,
        })
    }

    async fn set(&self, client_id: &ClientId, session: &Session) -> Result<()> {
        let mut inner = self.lock_swept()?;

        if inner.rejected.contains(client_id) {
            return Err(StoreError::Rejected(*client_id));
        }

        inner.sessions.insert(*client_id, session.clone());
        Ok(())
    }

    async fn delete(&self, client_id: &ClientId) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.sessions.remove(client_id).is_some() {
            tracing::debug!(client_id = %client_id, "deleted completed session");
        }
        Ok(())
    }

    async fn sweep(&self) -> Result<Vec<ClientId>> {
        let mut inner = self.lock()?;
        Ok(inner.sweep(clock::now(), self.config.inactivity_timeout))
    }

    async fn active_count(&self) -> Result<usize> {
        let inner = self.lock()?;
        Ok(inner.sessions.len())
    }

    async fn rejected_count(&self) -> Result<usize> {
        let inner = self.lock()?;
        Ok(inner.rejected.len())
    }
}
