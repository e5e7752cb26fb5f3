//! Incremental MD5 checksum over emitted numbers.
//!
//! Each value is fed as its base-10 text with no separator, so the final
//! digest equals `MD5(d1 || d2 || ... || dn)`.

use std::fmt;

use md5::{Digest, Md5};

/// Running digest fed one number at a time.
#[derive(Clone, Default)]
pub struct RunningChecksum {
    hasher: Md5,
    fed: u64,
}

impl RunningChecksum {
    /// Create an empty checksum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the decimal encoding of `value`.
    pub fn feed(&mut self, value: u32) {
        self.hasher.update(value.to_string().as_bytes());
        self.fed += 1;
    }

    /// Number of values fed so far.
    pub fn fed(&self) -> u64 {
        self.fed
    }

    /// Consume the checksum and return the lowercase hex digest.
    pub fn finalize(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

impl fmt::Debug for RunningChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunningChecksum").field("fed", &self.fed).finish_non_exhaustive()
    }
}

impl Extend<u32> for RunningChecksum {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for value in iter {
            self.feed(value);
        }
    }
}

/// Compute the checksum of a complete sequence.
pub fn checksum_of(values: &[u32]) -> String {
    let mut checksum = RunningChecksum::new();
    checksum.extend(values.iter().copied());
    checksum.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_split_feed_matches_whole(
            values in prop::collection::vec(any::<u32>(), 0..200),
            split in 0usize..200,
        ) {
            let split = split.min(values.len());
            let mut running = RunningChecksum::new();
            running.extend(values[..split].iter().copied());
            let mut resumed = running.clone();
            resumed.extend(values[split..].iter().copied());

            prop_assert_eq!(resumed.finalize(), checksum_of(&values));
        }
    }

    #[test]
    fn test_empty_checksum() {
        assert_eq!(checksum_of(&[]), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_seed_one_first_four() {
        let values = [1791095845, 4282876139, 3093770124, 4005303368];
        assert_eq!(checksum_of(&values), "41e6514a7f7b64336e30250adf67c460");
    }

    #[test]
    fn test_incremental_matches_whole() {
        let values = [7u32, 0, 42, u32::MAX, 100];
        let mut running = RunningChecksum::new();
        for v in values {
            running.feed(v);
        }
        assert_eq!(running.fed(), 5);
        assert_eq!(running.finalize(), checksum_of(&values));
    }

    #[test]
    fn test_matches_plain_md5_of_decimal_text() {
        let values = [1u32, 23, 456];
        let expected = hex::encode(Md5::digest(b"123456"));
        assert_eq!(checksum_of(&values), expected);
    }

    #[test]
    fn test_clone_snapshot_is_independent() {
        let mut a = RunningChecksum::new();
        a.feed(1);
        let snapshot = a.clone();
        a.feed(2);
        assert_eq!(snapshot.finalize(), checksum_of(&[1]));
        assert_eq!(a.finalize(), checksum_of(&[1, 2]));
    }
}
