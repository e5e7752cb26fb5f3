//! Test fixtures and helpers.
//!
//! Common setup code for engine-level tests: a shared in-memory store, an
//! engine over it, and a collector that plays the client.

use std::sync::Arc;

use numstream_core::ClientId;
use numstream_store::{MemoryStore, StoreConfig};
use numstream_stream::{
    memory, EngineConfig, NumberResponse, NumbersRequest, StreamEngine, StreamError,
    StreamReport,
};

/// A test fixture with a memory store and an engine over it.
pub struct TestFixture {
    pub store: Arc<MemoryStore>,
    pub engine: Arc<StreamEngine<MemoryStore>>,
}

/// Everything one connection received.
#[derive(Debug, Clone)]
pub struct Collected {
    /// Responses in arrival order.
    pub responses: Vec<NumberResponse>,
    /// The engine's account of the connection.
    pub report: StreamReport,
}

impl Collected {
    /// The numbers received.
    pub fn numbers(&self) -> Vec<u32> {
        self.responses.iter().map(|r| r.number).collect()
    }

    /// Checksum from the final payload, if it arrived.
    pub fn checksum(&self) -> Option<&str> {
        self.responses
            .last()
            .filter(|r| r.is_final())
            .map(|r| r.checksum.as_str())
    }
}

impl TestFixture {
    /// Create a fixture with default timing.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default(), StoreConfig::default())
    }

    /// Create a fixture with explicit engine and store settings.
    pub fn with_config(engine: EngineConfig, store: StoreConfig) -> Self {
        let store = Arc::new(MemoryStore::with_config(store));
        Self {
            engine: Arc::new(StreamEngine::new(Arc::clone(&store), engine)),
            store,
        }
    }

    /// Serve `request`, hanging up after `break_after` numbers if given.
    ///
    /// The engine runs on its own task and the sink holds one response at a
    /// time, so hanging up after `k` numbers interrupts the stream before
    /// number `k + 1` is delivered.
    pub async fn fetch(
        &self,
        request: NumbersRequest,
        break_after: Option<usize>,
    ) -> Result<Collected, StreamError> {
        let (mut sink, mut receiver) = memory::channel(1);
        let engine = Arc::clone(&self.engine);
        let task = tokio::spawn(async move { engine.serve(&request, &mut sink).await });

        let mut responses = Vec::new();
        while break_after.map_or(true, |k| responses.len() < k) {
            match receiver.recv().await {
                Some(response) => responses.push(response),
                None => break,
            }
        }
        drop(receiver);

        let report = task
            .await
            .map_err(|e| StreamError::Transport(format!("engine task failed: {e}")))??;
        Ok(Collected { responses, report })
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a request.
pub fn request(client_id: ClientId, count: u32, seed: u32) -> NumbersRequest {
    NumbersRequest::new(client_id, count, seed)
}

/// Distinct deterministic identities for multi-client tests.
pub fn client_ids(count: usize) -> Vec<ClientId> {
    (0..count)
        .map(|i| {
            let mut bytes = [0u8; 16];
            bytes[..8].copy_from_slice(&(i as u64).to_be_bytes());
            ClientId::from_bytes(bytes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use numstream_store::SessionStore;
    use numstream_stream::{EnginePhase, Outcome};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_fetch_complete() {
        let fixture = TestFixture::new();
        let id = client_ids(1)[0];

        let collected = fixture.fetch(request(id, 4, 1), None).await.unwrap();
        assert_eq!(
            collected.numbers(),
            vec![1791095845, 4282876139, 3093770124, 4005303368]
        );
        assert_eq!(
            collected.checksum(),
            Some("41e6514a7f7b64336e30250adf67c460")
        );
        assert!(collected.report.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_break_and_resume() {
        let fixture = TestFixture::new();
        let id = client_ids(1)[0];

        let first = fixture.fetch(request(id, 6, 42), Some(3)).await.unwrap();
        assert_eq!(first.checksum(), None);
        assert_eq!(first.report.outcome, Outcome::Interrupted { sent_count: 3 });
        assert_eq!(fixture.store.active_count().await.unwrap(), 1);

        let second = fixture.fetch(request(id, 0, 0), None).await.unwrap();
        assert_eq!(second.report.phase_entered, EnginePhase::Resumed);
        assert_eq!(
            second.checksum(),
            Some("fa4a99b041e12533ebe4a15c0182492a")
        );
        assert_eq!(fixture.store.active_count().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_rejected_after_timeout() {
        let fixture = TestFixture::with_config(
            EngineConfig::default(),
            StoreConfig {
                inactivity_timeout: Duration::from_secs(5),
            },
        );
        let id = client_ids(1)[0];

        fixture.fetch(request(id, 6, 1), Some(2)).await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;

        let err = fixture.fetch(request(id, 0, 0), None).await.unwrap_err();
        assert!(matches!(err, StreamError::Expired(_)));
    }

    #[test]
    fn test_client_ids_distinct() {
        let ids = client_ids(3);
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
    }
}
