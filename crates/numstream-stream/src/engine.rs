//! Per-connection stream state machine.
//!
//! Resolves a request against the session store, then emits one number per
//! tick until the sequence completes or the peer goes away.
//!
//! ```text
//! RESOLVING ─┬─> REJECTED
//!            ├─> FRESH ───┐
//!            └─> RESUMED ─┴─> STREAMING ─> DONE
//! ```

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::Instrument;

use numstream_core::{limits, ClientId, Session};
use numstream_store::{clock, Lookup, SessionStore};

use crate::error::{Result, StreamError};
use crate::messages::{NumberResponse, NumbersRequest};
use crate::transport::ResponseSink;

/// Configuration for stream behavior.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time between emitted numbers. Must be non-zero.
    pub emit_interval: Duration,
    /// Largest sequence a fresh request may ask for.
    pub max_count: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            emit_interval: limits::EMIT_INTERVAL,
            max_count: limits::MAX_COUNT,
        }
    }
}

/// How a request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// A new session was created.
    Fresh,
    /// A stored session is being continued.
    Resumed,
}

/// Outcome of the resolving step.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// New session, not yet persisted.
    Fresh(Session),
    /// Session taken from the store.
    Resumed(Session),
}

impl Resolution {
    /// Phase entered by this resolution.
    pub fn phase(&self) -> EnginePhase {
        match self {
            Resolution::Fresh(_) => EnginePhase::Fresh,
            Resolution::Resumed(_) => EnginePhase::Resumed,
        }
    }

    /// The session to stream from.
    pub fn session(&self) -> &Session {
        match self {
            Resolution::Fresh(session) | Resolution::Resumed(session) => session,
        }
    }

    /// Take the session to stream from.
    pub fn into_session(self) -> Session {
        match self {
            Resolution::Fresh(session) | Resolution::Resumed(session) => session,
        }
    }
}

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The final payload was delivered and the session deleted.
    Completed {
        /// Checksum carried by the final payload.
        checksum: String,
    },
    /// The peer went away; the session stays resumable.
    Interrupted {
        /// Numbers delivered over the session's lifetime.
        sent_count: u32,
    },
}

/// Result of serving one connection.
#[derive(Debug, Clone)]
pub struct StreamReport {
    /// Whether the stream started fresh or resumed.
    pub phase_entered: EnginePhase,
    /// Numbers delivered on this connection.
    pub emitted: u32,
    /// How the stream ended.
    pub outcome: Outcome,
}

impl StreamReport {
    /// Whether the sequence was delivered in full.
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, Outcome::Completed { .. })
    }
}

/// Drives streams for any number of connections over a shared store.
pub struct StreamEngine<S: SessionStore> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S: SessionStore> StreamEngine<S> {
    /// Create a new engine.
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Get the session store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a request into a fresh or resumed session.
    ///
    /// Nothing is written to the store here; a fresh session is persisted
    /// only once its first number has been delivered.
    pub async fn resolve(&self, request: &NumbersRequest) -> Result<Resolution> {
        let client_id = request
            .client_id()
            .map_err(|e| StreamError::InvalidRequest(e.to_string()))?;

        match self.store.lookup(&client_id).await? {
            Lookup::Rejected => {
                tracing::info!(%client_id, "rejecting expired client id");
                Err(StreamError::Expired(client_id))
            }
            Lookup::Active(session) => {
                tracing::debug!(
                    %client_id,
                    sent = session.sent_count,
                    remaining = session.remaining(),
                    "resuming session"
                );
                Ok(Resolution::Resumed(session))
            }
            Lookup::Unknown => self.fresh_session(client_id, request).map(Resolution::Fresh),
        }
    }

    fn fresh_session(&self, client_id: ClientId, request: &NumbersRequest) -> Result<Session> {
        if request.requested_count == 0 {
            return Err(StreamError::InvalidRequest("cannot send 0 numbers".into()));
        }

        let total_count = request.requested_count.min(self.config.max_count.max(1));
        if total_count < request.requested_count {
            tracing::debug!(
                %client_id,
                requested = request.requested_count,
                total_count,
                "clamping requested count"
            );
        }

        let seed = if request.seed != 0 {
            request.seed
        } else {
            entropy_seed()
        };
        tracing::debug!(%client_id, total_count, seed, "starting fresh session");

        Ok(Session::fresh(client_id, total_count, u64::from(seed), clock::now()))
    }

    /// Serve one request to completion or interruption.
    ///
    /// Rejections and invalid requests are returned as errors before anything
    /// is sent. A failed send ends the stream with [`Outcome::Interrupted`]
    /// and leaves the last persisted snapshot untouched.
    pub async fn serve<K>(&self, request: &NumbersRequest, sink: &mut K) -> Result<StreamReport>
    where
        K: ResponseSink + ?Sized,
    {
        let resolution = self.resolve(request).await?;
        let phase = resolution.phase();
        let session = resolution.into_session();

        let span = tracing::info_span!("stream", client_id = %session.client_id, ?phase);
        self.stream(phase, session, sink).instrument(span).await
    }

    async fn stream<K>(
        &self,
        phase: EnginePhase,
        mut session: Session,
        sink: &mut K,
    ) -> Result<StreamReport>
    where
        K: ResponseSink + ?Sized,
    {
        let client_id = session.client_id;
        let period = self.config.emit_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut emitted = 0;
        loop {
            ticker.tick().await;

            if session.is_final() {
                let checksum = session.final_checksum();
                let response = NumberResponse::last(session.next_value, checksum.clone());
                if let Err(e) = sink.send(response).await {
                    return Ok(interrupted(phase, emitted, &session, e));
                }
                emitted += 1;

                self.store.delete(&client_id).await?;
                tracing::info!(emitted, total = session.total_count, "stream complete");
                return Ok(StreamReport {
                    phase_entered: phase,
                    emitted,
                    outcome: Outcome::Completed { checksum },
                });
            }

            if let Err(e) = sink.send(NumberResponse::partial(session.next_value)).await {
                return Ok(interrupted(phase, emitted, &session, e));
            }
            emitted += 1;

            session.advance(clock::now());
            self.store.set(&client_id, &session).await?;
        }
    }
}

fn interrupted(
    phase: EnginePhase,
    emitted: u32,
    session: &Session,
    cause: StreamError,
) -> StreamReport {
    tracing::info!(
        emitted,
        sent = session.sent_count,
        total = session.total_count,
        %cause,
        "peer went away, session left resumable"
    );
    StreamReport {
        phase_entered: phase,
        emitted,
        outcome: Outcome::Interrupted {
            sent_count: session.sent_count,
        },
    }
}

/// Nonzero seed for requests that leave the choice to the server.
fn entropy_seed() -> u32 {
    rand::thread_rng().gen_range(1..=u32::MAX)
}
