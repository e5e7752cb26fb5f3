//! Session: resumable per-client delivery state.
//!
//! A session owns its generator and digest outright. Copies handed to or
//! taken from a store never alias the live copy driving a connection.

use std::time::{Duration, Instant};

use crate::checksum::RunningChecksum;
use crate::generator::Mt19937;
use crate::types::ClientId;

/// Delivery state for one logical stream.
///
/// Invariants:
/// - `sent_count < total_count` while the session exists.
/// - `next_value` has been produced by `generator` and fed into `digest`,
///   but not yet delivered.
#[derive(Debug, Clone)]
pub struct Session {
    /// Identity the session is keyed by.
    pub client_id: ClientId,
    /// Total numbers to deliver. Fixed at creation.
    pub total_count: u32,
    /// Numbers already delivered.
    pub sent_count: u32,
    /// The next number to deliver.
    pub next_value: u32,
    /// Generator positioned just after `next_value`.
    pub generator: Mt19937,
    /// Digest over every value produced so far, `next_value` included.
    pub digest: RunningChecksum,
    /// Time of the last successful mutation or resumption.
    pub last_touched: Instant,
}

impl Session {
    /// Create a fresh session and produce its first value.
    pub fn fresh(client_id: ClientId, total_count: u32, seed: u64, now: Instant) -> Self {
        let mut generator = Mt19937::new(seed);
        let mut digest = RunningChecksum::new();

        let next_value = generator.next_u32();
        digest.feed(next_value);

        Self {
            client_id,
            total_count,
            sent_count: 0,
            next_value,
            generator,
            digest,
            last_touched: now,
        }
    }

    /// Whether `next_value` is the last number of the sequence.
    pub fn is_final(&self) -> bool {
        self.sent_count + 1 == self.total_count
    }

    /// Numbers still to be delivered, `next_value` included.
    pub fn remaining(&self) -> u32 {
        self.total_count - self.sent_count
    }

    /// Record delivery of `next_value` and produce the following one.
    ///
    /// Must only be called after a successful send of a non-final value.
    pub fn advance(&mut self, now: Instant) {
        debug_assert!(!self.is_final(), "advance past the final value");

        self.next_value = self.generator.next_u32();
        self.digest.feed(self.next_value);
        self.sent_count += 1;
        self.last_touched = now;
    }

    /// Mark the session active at `now` without advancing it.
    pub fn touch(&mut self, now: Instant) {
        self.last_touched = now;
    }

    /// Time since the last mutation.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_touched)
    }

    /// Whether the session has been idle for strictly longer than `timeout`.
    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        self.idle_for(now) > timeout
    }

    /// Digest of every value produced so far.
    ///
    /// On the final value this is the checksum of the whole sequence.
    pub fn final_checksum(&self) -> String {
        self.digest.clone().finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::checksum_of;

    const SEED_ONE: [u32; 4] = [1791095845, 4282876139, 3093770124, 4005303368];

    #[test]
    fn test_fresh_session_produces_first_value() {
        let now = Instant::now();
        let session = Session::fresh(ClientId::NIL, 4, 1, now);

        assert_eq!(session.sent_count, 0);
        assert_eq!(session.next_value, SEED_ONE[0]);
        assert_eq!(session.digest.fed(), 1);
        assert_eq!(session.remaining(), 4);
        assert!(!session.is_final());
    }

    #[test]
    fn test_advance_walks_sequence() {
        let now = Instant::now();
        let mut session = Session::fresh(ClientId::NIL, 4, 1, now);

        let mut delivered = vec![session.next_value];
        while !session.is_final() {
            session.advance(now);
            delivered.push(session.next_value);
        }

        assert_eq!(delivered, SEED_ONE);
        assert_eq!(session.sent_count, 3);
        assert_eq!(session.final_checksum(), checksum_of(&SEED_ONE));
    }

    #[test]
    fn test_digest_includes_pending_value() {
        let now = Instant::now();
        let mut session = Session::fresh(ClientId::NIL, 10, 1, now);
        session.advance(now);

        assert_eq!(session.final_checksum(), checksum_of(&SEED_ONE[..2]));
    }

    #[test]
    fn test_single_value_session_is_final() {
        let session = Session::fresh(ClientId::NIL, 1, 1, Instant::now());
        assert!(session.is_final());
        assert_eq!(session.final_checksum(), checksum_of(&SEED_ONE[..1]));
    }

    #[test]
    fn test_expiry_is_strict() {
        let start = Instant::now();
        let session = Session::fresh(ClientId::NIL, 4, 1, start);
        let timeout = Duration::from_secs(30);

        assert!(!session.is_expired(start + timeout, timeout));
        assert!(session.is_expired(start + timeout + Duration::from_millis(1), timeout));
    }

    #[test]
    fn test_touch_resets_idle_time() {
        let start = Instant::now();
        let timeout = Duration::from_secs(30);
        let mut session = Session::fresh(ClientId::NIL, 4, 1, start);

        let later = start + Duration::from_millis(29_500);
        session.touch(later);
        assert_eq!(session.sent_count, 0);
        assert_eq!(session.idle_for(later), Duration::ZERO);
        assert!(!session.is_expired(later + timeout, timeout));
    }

    #[test]
    fn test_clone_does_not_alias() {
        let now = Instant::now();
        let mut live = Session::fresh(ClientId::NIL, 10, 1, now);
        let snapshot = live.clone();

        live.advance(now);

        assert_eq!(snapshot.sent_count, 0);
        assert_eq!(snapshot.next_value, SEED_ONE[0]);
        assert_eq!(snapshot.final_checksum(), checksum_of(&SEED_ONE[..1]));
    }
}
