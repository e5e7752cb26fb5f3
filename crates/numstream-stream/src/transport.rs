//! Transport abstraction for delivering responses.
//!
//! The engine only needs to push responses at its peer and learn when the
//! peer has gone. A failed send is that signal.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::codec::write_message;
use crate::error::{Result, StreamError};
use crate::messages::{NumberResponse, StreamMessage};

/// Sink for server-streamed responses.
///
/// An `Err` from [`send`](ResponseSink::send) means the response was not
/// delivered and the peer should be treated as gone.
#[async_trait]
pub trait ResponseSink: Send {
    /// Deliver one response.
    async fn send(&mut self, response: NumberResponse) -> Result<()>;
}

/// Watches the read half of a connection for the peer going away.
///
/// Clients keep their write half open for the life of a stream, so EOF or
/// a read error means they closed the connection.
pub struct PeerMonitor {
    closed: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl PeerMonitor {
    /// Start watching `reader`.
    pub fn spawn<R>(mut reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut scratch = [0u8; 256];
            loop {
                match reader.read(&mut scratch).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => continue,
                }
            }
            let _ = tx.send(true);
        });

        Self { closed: rx, task }
    }

    /// Whether the peer has closed its side.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

impl Drop for PeerMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Sink writing framed responses to an async writer.
pub struct FramedSink<W> {
    writer: W,
    monitor: Option<PeerMonitor>,
}

impl<W: AsyncWrite + Unpin + Send> FramedSink<W> {
    /// Create a sink over `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            monitor: None,
        }
    }

    /// Refuse sends once `monitor` reports the peer closed.
    pub fn with_peer_monitor(mut self, monitor: PeerMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Get the underlying writer.
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ResponseSink for FramedSink<W> {
    async fn send(&mut self, response: NumberResponse) -> Result<()> {
        if self.monitor.as_ref().is_some_and(PeerMonitor::is_closed) {
            return Err(StreamError::Transport("peer closed connection".into()));
        }

        write_message(&mut self.writer, &StreamMessage::Number(response))
            .await
            .map_err(|e| StreamError::Transport(e.to_string()))
    }
}

/// A simple in-memory transport for testing.
///
/// Uses a channel to stand in for the connection. Dropping or closing the
/// receiver plays the part of the client hanging up.
pub mod memory {
    use super::*;
    use tokio::sync::mpsc;

    /// Create a connected sink/receiver pair.
    pub fn channel(capacity: usize) -> (MemorySink, MemoryReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (MemorySink { tx }, MemoryReceiver { rx })
    }

    /// Sending half, handed to the engine.
    pub struct MemorySink {
        tx: mpsc::Sender<NumberResponse>,
    }

    /// Receiving half, held by the test as the client.
    pub struct MemoryReceiver {
        rx: mpsc::Receiver<NumberResponse>,
    }

    impl MemoryReceiver {
        /// Receive the next response, or `None` once the sink is dropped.
        pub async fn recv(&mut self) -> Option<NumberResponse> {
            self.rx.recv().await
        }

        /// Hang up: every later send fails.
        pub fn close(&mut self) {
            self.rx.close();
        }
    }

    #[async_trait]
    impl ResponseSink for MemorySink {
        async fn send(&mut self, response: NumberResponse) -> Result<()> {
            self.tx
                .send(response)
                .await
                .map_err(|_| StreamError::Transport("peer disconnected".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory;
    use super::*;
    use crate::codec::read_message;

    #[tokio::test]
    async fn test_memory_sink_send_recv() {
        let (mut sink, mut receiver) = memory::channel(4);

        sink.send(NumberResponse::partial(1)).await.unwrap();
        sink.send(NumberResponse::last(2, "abc".into())).await.unwrap();

        assert_eq!(receiver.recv().await, Some(NumberResponse::partial(1)));
        let last = receiver.recv().await.unwrap();
        assert!(last.is_final());
    }

    #[tokio::test]
    async fn test_memory_sink_fails_after_close() {
        let (mut sink, mut receiver) = memory::channel(4);
        receiver.close();

        let err = sink.send(NumberResponse::partial(1)).await.unwrap_err();
        assert!(matches!(err, StreamError::Transport(_)));
    }

    #[tokio::test]
    async fn test_framed_sink_writes_frames() {
        let (server, mut client) = tokio::io::duplex(1024);
        let mut sink = FramedSink::new(server);

        sink.send(NumberResponse::partial(9)).await.unwrap();

        let msg = read_message(&mut client).await.unwrap().unwrap();
        assert_eq!(msg, StreamMessage::Number(NumberResponse::partial(9)));
    }

    #[tokio::test]
    async fn test_peer_monitor_detects_close() {
        let (server_read, client_write) = tokio::io::duplex(64);
        let (server_write, _client_read) = tokio::io::duplex(1024);

        let monitor = PeerMonitor::spawn(server_read);
        let mut sink = FramedSink::new(server_write).with_peer_monitor(monitor);

        sink.send(NumberResponse::partial(1)).await.unwrap();

        drop(client_write);
        // Let the monitor task observe EOF.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let err = sink.send(NumberResponse::partial(2)).await.unwrap_err();
        assert!(matches!(err, StreamError::Transport(_)));
    }
}
