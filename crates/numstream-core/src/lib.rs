//! # Numstream Core
//!
//! Pure primitives for numstream: the MT19937 number source, the running
//! MD5 checksum, and the resumable [`Session`] built from them.
//!
//! This crate contains no I/O, no storage, no networking. Time is always
//! passed in by the caller.
//!
//! ## Key Types
//!
//! - [`Mt19937`] - Deterministic 32-bit Mersenne Twister
//! - [`RunningChecksum`] - Incremental digest over decimal-encoded numbers
//! - [`Session`] - Per-client delivery state
//! - [`ClientId`] - 16-byte caller-supplied identity

pub mod checksum;
pub mod error;
pub mod generator;
pub mod session;
pub mod types;

pub use checksum::{checksum_of, RunningChecksum};
pub use error::CoreError;
pub use generator::Mt19937;
pub use session::Session;
pub use types::ClientId;

/// Protocol limits and timing constants.
pub mod limits {
    use std::time::Duration;

    /// Length of a client identity in bytes.
    pub const CLIENT_ID_LEN: usize = 16;
    /// Largest number of values a single session delivers.
    pub const MAX_COUNT: u32 = 65535;
    /// Idle time after which a session is evicted and its identity rejected.
    pub const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(30);
    /// Cadence at which numbers are emitted.
    pub const EMIT_INTERVAL: Duration = Duration::from_secs(1);

    /// Clamp a requested count to [`MAX_COUNT`].
    pub fn clamp_count(requested: u32) -> u32 {
        requested.min(MAX_COUNT)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_clamp_count() {
            assert_eq!(clamp_count(0), 0);
            assert_eq!(clamp_count(10), 10);
            assert_eq!(clamp_count(65535), 65535);
            assert_eq!(clamp_count(70000), 65535);
            assert_eq!(clamp_count(u32::MAX), 65535);
        }
    }
}
