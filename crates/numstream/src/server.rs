//! TCP server: one stream engine shared by every connection.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::Instrument;

use numstream_store::{MemoryStore, SessionStore};
use numstream_stream::{
    read_message, write_message, ErrorCode, FramedSink, PeerMonitor, StreamEngine,
    StreamMessage,
};

use crate::config::ServerConfig;
use crate::error::Result;

/// Serves number streams over TCP.
///
/// Each accepted connection carries exactly one request and is driven on
/// its own task. Sessions outlive connections in the shared store.
pub struct NumberServer<S: SessionStore = MemoryStore> {
    engine: Arc<StreamEngine<S>>,
    addr: SocketAddr,
}

impl NumberServer<MemoryStore> {
    /// Create a server with an in-memory session store.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(MemoryStore::with_config(config.store.clone()));
        Self::with_store(store, config)
    }
}

impl<S: SessionStore + 'static> NumberServer<S> {
    /// Create a server over an existing store.
    pub fn with_store(store: Arc<S>, config: ServerConfig) -> Self {
        Self {
            engine: Arc::new(StreamEngine::new(store, config.engine)),
            addr: config.addr,
        }
    }

    /// Get the stream engine.
    pub fn engine(&self) -> &Arc<StreamEngine<S>> {
        &self.engine
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        Ok(listener)
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Accept connections on `listener` until `shutdown` resolves.
    ///
    /// Streams already in flight keep running on their own tasks.
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("shutting down");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    let (socket, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "accept failed");
                            continue;
                        }
                    };

                    let engine = Arc::clone(&self.engine);
                    let span = tracing::info_span!("conn", %peer);
                    tokio::spawn(
                        async move {
                            if let Err(e) = handle_connection(&engine, socket).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        }
                        .instrument(span),
                    );
                }
            }
        }
    }
}

/// Read one request from `socket` and stream the response.
///
/// Rejected and malformed requests are answered with an `Error` frame.
pub async fn handle_connection<S: SessionStore>(
    engine: &StreamEngine<S>,
    socket: TcpStream,
) -> Result<()> {
    socket.set_nodelay(true)?;
    let (mut reader, mut writer) = socket.into_split();

    let request = match read_message(&mut reader).await? {
        Some(StreamMessage::Request(request)) => request,
        Some(_) => {
            let reply = StreamMessage::Error {
                code: ErrorCode::InvalidRequest,
                message: "expected a request".into(),
            };
            write_message(&mut writer, &reply).await?;
            return Ok(());
        }
        None => return Ok(()),
    };

    let mut sink = FramedSink::new(writer).with_peer_monitor(PeerMonitor::spawn(reader));
    match engine.serve(&request, &mut sink).await {
        Ok(report) => {
            tracing::debug!(
                phase = ?report.phase_entered,
                emitted = report.emitted,
                outcome = ?report.outcome,
                "stream finished"
            );
            Ok(())
        }
        Err(e) => {
            let reply = StreamMessage::Error {
                code: e.code(),
                message: e.wire_message(),
            };
            // The peer may already be gone.
            let _ = write_message(sink.writer_mut(), &reply).await;
            Err(e.into())
        }
    }
}
