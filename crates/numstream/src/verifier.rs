//! End-to-end checksum verification.
//!
//! The client recomputes the checksum from the numbers it received and
//! compares it with the server's. The split-stream run deliberately breaks
//! the connection halfway through to prove that resumption loses nothing.

use std::time::Duration;

use tokio::net::ToSocketAddrs;

use numstream_core::{checksum_of, limits, ClientId};

use crate::client::NumberClient;
use crate::error::{NumstreamError, Result};

/// Pause between the two halves of a split-stream run.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Result of checking a received sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Local, server and expected checksums agree.
    Verified { checksum: String },
    /// The server's checksum does not cover the numbers received.
    ChecksumMismatch { calculated: String, server: String },
    /// The sequence is self-consistent but not the one expected.
    UnexpectedChecksum { expected: String, calculated: String },
}

impl Verification {
    /// Check if the sequence verified.
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified { .. })
    }

    /// The verified checksum, or the mismatch as an error.
    pub fn into_result(self) -> Result<String> {
        match self {
            Verification::Verified { checksum } => Ok(checksum),
            Verification::ChecksumMismatch { calculated, server } => {
                Err(NumstreamError::ChecksumMismatch { calculated, server })
            }
            Verification::UnexpectedChecksum {
                expected,
                calculated,
            } => Err(NumstreamError::UnexpectedChecksum {
                expected,
                calculated,
            }),
        }
    }
}

/// Verify `numbers` against the server's checksum and, if given, an
/// expected one.
pub fn verify_sequence(
    numbers: &[u32],
    server_checksum: &str,
    expected: Option<&str>,
) -> Verification {
    let calculated = checksum_of(numbers);

    if calculated != server_checksum {
        return Verification::ChecksumMismatch {
            calculated,
            server: server_checksum.to_string(),
        };
    }

    match expected {
        Some(expected) if expected != calculated => Verification::UnexpectedChecksum {
            expected: expected.to_string(),
            calculated,
        },
        _ => Verification::Verified {
            checksum: calculated,
        },
    }
}

/// Parameters for [`run_split_stream`].
#[derive(Debug, Clone)]
pub struct SplitStreamParams {
    /// Identity shared by both connections.
    pub client_id: ClientId,
    /// Total numbers; must be even and positive.
    pub count: u32,
    /// Seed for the first connection.
    pub seed: u32,
    /// Checksum the whole sequence must have, if known.
    pub expected_checksum: Option<String>,
    /// Pause before reconnecting.
    pub reconnect_delay: Duration,
}

impl SplitStreamParams {
    /// Parameters with no expected checksum and the default delay.
    pub fn new(client_id: ClientId, count: u32, seed: u32) -> Self {
        Self {
            client_id,
            count,
            seed,
            expected_checksum: None,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    /// Require the sequence to have `checksum`.
    pub fn with_expected_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.expected_checksum = Some(checksum.into());
        self
    }

    /// Set the pause before reconnecting.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

/// A verified sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedRun {
    /// Identity the sequence was fetched under.
    pub client_id: ClientId,
    /// Every number received, in order.
    pub numbers: Vec<u32>,
    /// The agreed checksum.
    pub checksum: String,
}

/// Fetch half a sequence, disconnect, resume, and verify the whole.
///
/// `count` is clamped to the server's cap before the evenness check.
pub async fn run_split_stream<A>(addr: A, params: SplitStreamParams) -> Result<VerifiedRun>
where
    A: ToSocketAddrs + Clone,
{
    run_split_stream_with(addr, params, |_| {}).await
}

/// Like [`run_split_stream`], calling `on_number` as each number arrives on
/// either connection.
pub async fn run_split_stream_with<A>(
    addr: A,
    params: SplitStreamParams,
    mut on_number: impl FnMut(u32),
) -> Result<VerifiedRun>
where
    A: ToSocketAddrs + Clone,
{
    let count = limits::clamp_count(params.count);
    if count == 0 || count % 2 != 0 {
        return Err(NumstreamError::OddCount(count));
    }
    let half = count / 2;

    let first = NumberClient::connect(addr.clone())
        .await?
        .get_numbers_with(
            params.client_id,
            count,
            params.seed,
            Some(half),
            &mut on_number,
        )
        .await?;
    if first.is_complete() || first.numbers.len() != half as usize {
        return Err(NumstreamError::Protocol(format!(
            "first connection delivered {} of {half} numbers",
            first.numbers.len()
        )));
    }
    tracing::debug!(client_id = %params.client_id, half, "first half received");

    tokio::time::sleep(params.reconnect_delay).await;

    let second = NumberClient::connect(addr)
        .await?
        .get_numbers_with(params.client_id, count, 0, None, &mut on_number)
        .await?;
    let server_checksum = second.checksum.ok_or(NumstreamError::MissingChecksum {
        received: half as usize + second.numbers.len(),
    })?;

    let mut numbers = first.numbers;
    numbers.extend(second.numbers);

    let checksum = verify_sequence(
        &numbers,
        &server_checksum,
        params.expected_checksum.as_deref(),
    )
    .into_result()?;

    Ok(VerifiedRun {
        client_id: params.client_id,
        numbers,
        checksum,
    })
}

/// Fetch `count` numbers in one go under a fresh identity and verify them.
pub async fn run_standard<A: ToSocketAddrs>(addr: A, count: u32) -> Result<VerifiedRun> {
    run_standard_with(addr, count, |_| {}).await
}

/// Like [`run_standard`], calling `on_number` as each number arrives.
pub async fn run_standard_with<A: ToSocketAddrs>(
    addr: A,
    count: u32,
    on_number: impl FnMut(u32),
) -> Result<VerifiedRun> {
    let client_id = ClientId::random();
    let fetch = NumberClient::connect(addr)
        .await?
        .get_numbers_with(client_id, count, 0, None, on_number)
        .await?;

    let server_checksum = fetch.checksum.ok_or(NumstreamError::MissingChecksum {
        received: fetch.numbers.len(),
    })?;
    let checksum = verify_sequence(&fetch.numbers, &server_checksum, None).into_result()?;

    Ok(VerifiedRun {
        client_id,
        numbers: fetch.numbers,
        checksum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED_ONE: [u32; 4] = [1791095845, 4282876139, 3093770124, 4005303368];
    const SEED_ONE_CHECKSUM: &str = "41e6514a7f7b64336e30250adf67c460";

    #[test]
    fn test_verified() {
        let result = verify_sequence(&SEED_ONE, SEED_ONE_CHECKSUM, Some(SEED_ONE_CHECKSUM));
        assert_eq!(
            result,
            Verification::Verified {
                checksum: SEED_ONE_CHECKSUM.into()
            }
        );
        assert!(verify_sequence(&SEED_ONE, SEED_ONE_CHECKSUM, None).is_verified());
    }

    #[test]
    fn test_dropped_number_is_mismatch() {
        let result = verify_sequence(&SEED_ONE[..3], SEED_ONE_CHECKSUM, None);
        assert!(matches!(result, Verification::ChecksumMismatch { .. }));
        assert!(matches!(
            result.into_result(),
            Err(NumstreamError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_unexpected_checksum() {
        let result = verify_sequence(&SEED_ONE, SEED_ONE_CHECKSUM, Some("00"));
        assert_eq!(
            result,
            Verification::UnexpectedChecksum {
                expected: "00".into(),
                calculated: SEED_ONE_CHECKSUM.into(),
            }
        );
    }

    #[tokio::test]
    async fn test_split_rejects_odd_count() {
        let params = SplitStreamParams::new(ClientId::NIL, 7, 1);
        let err = run_split_stream("127.0.0.1:1", params).await.unwrap_err();
        assert!(matches!(err, NumstreamError::OddCount(7)));

        // Clamped to 65535 first, which is odd.
        let params = SplitStreamParams::new(ClientId::NIL, 70000, 1);
        let err = run_split_stream("127.0.0.1:1", params).await.unwrap_err();
        assert!(matches!(err, NumstreamError::OddCount(65535)));
    }

    #[test]
    fn test_params_builder() {
        let params = SplitStreamParams::new(ClientId::NIL, 4, 1)
            .with_expected_checksum(SEED_ONE_CHECKSUM)
            .with_reconnect_delay(Duration::from_millis(10));
        assert_eq!(params.expected_checksum.as_deref(), Some(SEED_ONE_CHECKSUM));
        assert_eq!(params.reconnect_delay, Duration::from_millis(10));
    }
}
