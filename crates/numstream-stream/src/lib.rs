//! # Numstream Stream
//!
//! Wire protocol and the per-connection engine that streams numbers to a
//! client, resuming interrupted sequences from the session store.
//!
//! ## Overview
//!
//! A client opens a connection and sends one request. The engine resolves
//! it against the store (rejected, resumed or fresh), then emits one number
//! per tick. The last number carries the MD5 checksum of the whole sequence.
//! If the client disconnects early, the last persisted snapshot stays in the
//! store and a later request with the same identity picks up from there.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use numstream_core::ClientId;
//! use numstream_store::MemoryStore;
//! use numstream_stream::{memory, EngineConfig, NumbersRequest, StreamEngine};
//!
//! async fn example() {
//!     let engine = StreamEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default());
//!     let (mut sink, mut receiver) = memory::channel(16);
//!
//!     let request = NumbersRequest::new(ClientId::random(), 4, 1);
//!     let report = engine.serve(&request, &mut sink).await.unwrap();
//!     assert!(report.is_complete());
//!
//!     while let Some(response) = receiver.recv().await {
//!         println!("{}", response.number);
//!     }
//! }
//! ```
//!
//! ## Message Flow
//!
//! ```text
//! Client                              Server
//!   |-------- Request --------------->|
//!   |<------- Number -----------------|  (1s)
//!   |<------- Number -----------------|  (1s)
//!   |<------- Number + checksum ------|  (1s)
//! ```
//!
//! A rejected or invalid request is answered with a single `Error` frame.

pub mod codec;
pub mod engine;
pub mod error;
pub mod messages;
pub mod transport;

pub use codec::{decode, encode, read_message, write_message};
pub use engine::{EngineConfig, EnginePhase, Outcome, Resolution, StreamEngine, StreamReport};
pub use error::{Result, StreamError};
pub use messages::{limits, ErrorCode, NumberResponse, NumbersRequest, StreamMessage};
pub use transport::{memory, FramedSink, PeerMonitor, ResponseSink};
