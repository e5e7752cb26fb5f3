//! Golden test vectors for deterministic verification.
//!
//! Any implementation of the server must reproduce these sequences and
//! checksums bit for bit, since clients recompute the checksum from the
//! numbers they receive.

use serde::Serialize;

use numstream_core::{checksum_of, Mt19937};

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Generator seed.
    pub seed: u64,
    /// Sequence length.
    pub count: u32,
    /// Leading outputs of the sequence.
    pub expected_prefix: &'static [u32],
    /// Last output of the sequence.
    pub expected_last: u32,
    /// Hex MD5 of the whole sequence.
    pub expected_checksum: &'static str,
}

impl GoldenVector {
    /// Generate the full sequence for this vector.
    pub fn sequence(&self) -> Vec<u32> {
        let mut generator = Mt19937::new(self.seed);
        (0..self.count).map(|_| generator.next_u32()).collect()
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "seed 1, four numbers",
            seed: 1,
            count: 4,
            expected_prefix: &[1791095845, 4282876139, 3093770124, 4005303368],
            expected_last: 4005303368,
            expected_checksum: "41e6514a7f7b64336e30250adf67c460",
        },
        GoldenVector {
            name: "seed 1, single number",
            seed: 1,
            count: 1,
            expected_prefix: &[1791095845],
            expected_last: 1791095845,
            expected_checksum: "39ed94b06f8d816cd144e2cd391966df",
        },
        GoldenVector {
            name: "seed 1, ten numbers",
            seed: 1,
            count: 10,
            expected_prefix: &[
                1791095845, 4282876139, 3093770124, 4005303368, 491263, 550290313, 1298508491,
                4290846341, 630311759, 1013994432,
            ],
            expected_last: 1013994432,
            expected_checksum: "82e1ff87974637f7c4b697cfbe93c7ad",
        },
        GoldenVector {
            name: "seed 1, past the first twist",
            seed: 1,
            count: 1000,
            expected_prefix: &[1791095845, 4282876139],
            expected_last: 548926898,
            expected_checksum: "14a163340d78bc81f6e2d7d801ff1629",
        },
        GoldenVector {
            name: "seed 42",
            seed: 42,
            count: 6,
            expected_prefix: &[
                1608637542, 3421126067, 4083286876, 787846414, 3143890026, 3348747335,
            ],
            expected_last: 3348747335,
            expected_checksum: "fa4a99b041e12533ebe4a15c0182492a",
        },
        GoldenVector {
            name: "reference default seed",
            seed: 5489,
            count: 2,
            expected_prefix: &[3499211612, 581869302],
            expected_last: 581869302,
            expected_checksum: "ff507f563ee4d76c7601ba3130fd250a",
        },
        GoldenVector {
            name: "seed 0xdeadbeef",
            seed: 0xdead_beef,
            count: 8,
            expected_prefix: &[956529277, 3842322136, 3319553134, 1843186657],
            expected_last: 1676224337,
            expected_checksum: "be459f09d412b235c9f0f1e3e6c67cce",
        },
        GoldenVector {
            name: "high seed bits ignored",
            seed: (1 << 32) + 1,
            count: 4,
            expected_prefix: &[1791095845, 4282876139, 3093770124, 4005303368],
            expected_last: 4005303368,
            expected_checksum: "41e6514a7f7b64336e30250adf67c460",
        },
        GoldenVector {
            name: "seed 123456789",
            seed: 123_456_789,
            count: 16,
            expected_prefix: &[2288500408, 4254805660, 2294099250, 56498137],
            expected_last: 3981019872,
            expected_checksum: "b931f31414de6359ca088b8ba3b9922b",
        },
    ]
}

/// Find a vector by name.
pub fn vector(name: &str) -> Option<GoldenVector> {
    all_vectors().into_iter().find(|v| v.name == name)
}

/// Verify every vector, reporting the first failure.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_vectors() {
        let sequence = vector.sequence();

        if !sequence.starts_with(vector.expected_prefix) {
            return Err(format!("{}: prefix mismatch", vector.name));
        }
        if sequence.last() != Some(&vector.expected_last) {
            return Err(format!(
                "{}: last value {:?}, expected {}",
                vector.name,
                sequence.last(),
                vector.expected_last
            ));
        }

        let checksum = checksum_of(&sequence);
        if checksum != vector.expected_checksum {
            return Err(format!(
                "{}: checksum {}, expected {}",
                vector.name, checksum, vector.expected_checksum
            ));
        }
    }
    Ok(())
}

/// Export all vectors as JSON for other implementations.
pub fn export_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_verify() {
        verify_all_vectors().unwrap();
    }

    #[test]
    fn test_vector_lookup() {
        let v = vector("seed 42").unwrap();
        assert_eq!(v.count, 6);
        assert!(vector("no such vector").is_none());
    }

    #[test]
    fn test_export_json() {
        let json = export_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let vectors = parsed.as_array().unwrap();
        assert_eq!(vectors.len(), all_vectors().len());
        assert_eq!(vectors[0]["seed"], 1);
        assert_eq!(
            vectors[0]["expected_checksum"],
            "41e6514a7f7b64336e30250adf67c460"
        );
    }
}
