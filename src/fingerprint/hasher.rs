//! Content digests for module files

use crate::types::Digest;
use serde::{Deserialize, Serialize};
use sha1::{Digest as _, Sha1};
use std::fmt;

/// Hash function used for content digests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Blake3,
}

impl HashAlgorithm {
    /// Length of the full lowercase hex digest.
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Blake3 => 64,
        }
    }

    /// Full lowercase hex digest of `bytes`.
    pub fn hex_digest(self, bytes: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
            HashAlgorithm::Blake3 => blake3::hash(bytes).to_hex().to_string(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha1 => f.write_str("sha1"),
            HashAlgorithm::Blake3 => f.write_str("blake3"),
        }
    }
}

/// Compute the truncated digest embedded in a renamed file.
///
/// `len` is clamped to the algorithm's full hex length.
pub fn compute_digest(bytes: &[u8], algorithm: HashAlgorithm, len: usize) -> Digest {
    let mut hex = algorithm.hex_digest(bytes);
    hex.truncate(len.min(algorithm.hex_len()));
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sha1_known_vector() {
        assert_eq!(
            HashAlgorithm::Sha1.hex_digest(b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(compute_digest(b"abc", HashAlgorithm::Sha1, 8), "a9993e36");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(compute_digest(b"", HashAlgorithm::Sha1, 8), "da39a3ee");
    }

    #[test]
    fn test_blake3_length() {
        assert_eq!(HashAlgorithm::Blake3.hex_digest(b"abc").len(), 64);
        assert_eq!(compute_digest(b"abc", HashAlgorithm::Blake3, 100).len(), 64);
    }

    #[test]
    fn test_algorithm_serde_names() {
        let parsed: HashAlgorithm = serde_json::from_str("\"blake3\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Blake3);
        assert_eq!(HashAlgorithm::default().to_string(), "sha1");
    }

    proptest! {
        #[test]
        fn digest_is_prefix_of_full_hash(bytes in proptest::collection::vec(any::<u8>(), 0..512), len in 1usize..=40) {
            let full = HashAlgorithm::Sha1.hex_digest(&bytes);
            let short = compute_digest(&bytes, HashAlgorithm::Sha1, len);
            prop_assert_eq!(short.len(), len);
            prop_assert!(full.starts_with(&short));
            prop_assert!(short.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }
}
