//! # Numstream
//!
//! Resumable, checksum-verified streams of MT19937 numbers over TCP.
//!
//! ## Overview
//!
//! A client asks for `N` numbers under a 16-byte identity. The server emits
//! one number per second and attaches the MD5 checksum of the whole
//! sequence to the last one. If the connection drops, the client reconnects
//! with the same identity and a zero seed and the server continues exactly
//! where it stopped. Identities idle for more than 30 seconds are rejected
//! for good.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use numstream::{run_split_stream, NumberServer, ServerConfig, SplitStreamParams};
//! use numstream::core::ClientId;
//!
//! async fn example() -> numstream::Result<()> {
//!     let server = NumberServer::new(ServerConfig::default());
//!     tokio::spawn(async move { server.run(std::future::pending()).await });
//!
//!     let params = SplitStreamParams::new(ClientId::random(), 4, 1)
//!         .with_expected_checksum("41e6514a7f7b64336e30250adf67c460");
//!     let run = run_split_stream("127.0.0.1:50051", params).await?;
//!     println!("SUCCESS: checksum={}", run.checksum);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `numstream::core` - Generator, checksum, session
//! - `numstream::store` - Session storage
//! - `numstream::stream` - Wire protocol and stream engine

pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod verifier;

// Re-export component crates
pub use numstream_core as core;
pub use numstream_store as store;
pub use numstream_stream as stream;

pub use client::{Fetch, NumberClient};
pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::{NumstreamError, Result};
pub use server::{handle_connection, NumberServer};
pub use verifier::{
    run_split_stream, run_split_stream_with, run_standard, run_standard_with, verify_sequence,
    SplitStreamParams, Verification, VerifiedRun, DEFAULT_RECONNECT_DELAY,
};

pub use numstream_core::{checksum_of, ClientId, Mt19937, RunningChecksum};
