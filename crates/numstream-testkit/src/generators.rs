//! Proptest generators for property-based testing.

use std::time::Instant;

use proptest::prelude::*;

use numstream_core::{ClientId, Mt19937, Session};

/// Generate a random ClientId.
pub fn client_id() -> impl Strategy<Value = ClientId> {
    any::<[u8; 16]>().prop_map(ClientId::from_bytes)
}

/// Generate an explicit (nonzero) request seed.
pub fn seed() -> impl Strategy<Value = u32> {
    1u32..=u32::MAX
}

/// Generate a sequence length in `1..=max`.
pub fn count(max: u32) -> impl Strategy<Value = u32> {
    1u32..=max.max(1)
}

/// Generate an even sequence length in `2..=max`.
pub fn even_count(max: u32) -> impl Strategy<Value = u32> {
    (1u32..=(max / 2).max(1)).prop_map(|half| half * 2)
}

/// Parameters for a stream interrupted once and resumed.
#[derive(Debug, Clone)]
pub struct SplitParams {
    pub client_id: ClientId,
    pub seed: u32,
    pub count: u32,
    /// Numbers delivered before the interruption; `1..count`.
    pub split: u32,
}

impl Arbitrary for SplitParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (client_id(), seed(), 2u32..=64u32)
            .prop_flat_map(|(client_id, seed, count)| {
                (Just(client_id), Just(seed), Just(count), 1..count)
            })
            .prop_map(|(client_id, seed, count, split)| SplitParams {
                client_id,
                seed,
                count,
                split,
            })
            .boxed()
    }
}

/// The first `count` outputs for `seed`.
pub fn uninterrupted(seed: u32, count: u32) -> Vec<u32> {
    let mut generator = Mt19937::new(u64::from(seed));
    (0..count).map(|_| generator.next_u32()).collect()
}

/// Deliver a sequence through a session, restarting from a snapshot after
/// `split` numbers. Returns the numbers and the final checksum.
pub fn split_delivery(params: &SplitParams) -> (Vec<u32>, String) {
    let now = Instant::now();
    let mut session = Session::fresh(params.client_id, params.count, u64::from(params.seed), now);
    let mut numbers = Vec::with_capacity(params.count as usize);

    for _ in 0..params.split {
        numbers.push(session.next_value);
        session.advance(now);
    }

    // Continue from a copy, as a resumed connection would.
    let mut resumed = session.clone();
    drop(session);

    loop {
        numbers.push(resumed.next_value);
        if resumed.is_final() {
            return (numbers, resumed.final_checksum());
        }
        resumed.advance(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{request, TestFixture};
    use numstream_core::checksum_of;
    use numstream_stream::EnginePhase;

    proptest! {
        #[test]
        fn test_sequence_deterministic(seed in seed(), count in count(64)) {
            prop_assert_eq!(uninterrupted(seed, count), uninterrupted(seed, count));
        }

        #[test]
        fn test_split_delivery_matches_uninterrupted(params: SplitParams) {
            let (numbers, checksum) = split_delivery(&params);

            prop_assert_eq!(&numbers, &uninterrupted(params.seed, params.count));
            prop_assert_eq!(checksum, checksum_of(&numbers));
        }

        #[test]
        fn test_even_count_is_even(count in even_count(100)) {
            prop_assert!(count >= 2);
            prop_assert_eq!(count % 2, 0);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_engine_resumption_equivalence(
            client_id in client_id(),
            seed in seed(),
            count in even_count(24),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .start_paused(true)
                .build()
                .unwrap();

            let (numbers, server_checksum, phase) = runtime.block_on(async {
                let fixture = TestFixture::new();
                let half = (count / 2) as usize;

                let first = fixture
                    .fetch(request(client_id, count, seed), Some(half))
                    .await
                    .unwrap();
                let second = fixture
                    .fetch(request(client_id, 0, 0), None)
                    .await
                    .unwrap();

                let mut numbers = first.numbers();
                numbers.extend(second.numbers());
                let checksum = second.checksum().map(str::to_owned);
                (numbers, checksum, second.report.phase_entered)
            });

            prop_assert_eq!(phase, EnginePhase::Resumed);
            prop_assert_eq!(&numbers, &uninterrupted(seed, count));
            prop_assert_eq!(server_checksum, Some(checksum_of(&numbers)));
        }
    }
}
