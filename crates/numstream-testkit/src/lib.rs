//! # Numstream Testkit
//!
//! Testing utilities for numstream.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known seed/count pairs with their sequences and checksums
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A store and engine wired together, plus a collecting client
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the generator and checksum across implementations:
//!
//! ```rust
//! use numstream_core::checksum_of;
//! use numstream_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     assert_eq!(checksum_of(&vector.sequence()), vector.expected_checksum);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use numstream_testkit::generators::{split_delivery, uninterrupted, SplitParams};
//!
//! proptest! {
//!     #[test]
//!     fn resumption_loses_nothing(params: SplitParams) {
//!         let (numbers, _) = split_delivery(&params);
//!         prop_assert_eq!(numbers, uninterrupted(params.seed, params.count));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Drive the engine without a network:
//!
//! ```rust,no_run
//! use numstream_testkit::fixtures::{client_ids, request, TestFixture};
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let id = client_ids(1)[0];
//!     let collected = fixture.fetch(request(id, 4, 1), None).await.unwrap();
//!     assert!(collected.checksum().is_some());
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{client_ids, request, Collected, TestFixture};
pub use generators::{split_delivery, uninterrupted, SplitParams};
pub use vectors::{all_vectors, export_json, verify_all_vectors, GoldenVector};
