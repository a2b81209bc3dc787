use sha2::Digest;

use crate::{Result, VerifyError};

/// Incremental hasher over streamed chunk bytes.
///
/// The manifest wire format fixes SHA-256, but the trait keeps the
/// algorithm swappable for callers that carry their own digests.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

pub struct Sha256Hasher(sha2::Sha256);

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self) -> Vec<u8> {
        self.0.finalize().to_vec()
    }
}

impl Sha256Hasher {
    pub fn new() -> Self {
        Self(sha2::Sha256::new())
    }
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot SHA-256 of an in-memory chunk, lowercase hex.
pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(sha2::Sha256::digest(data))
}

/// Compare freshly downloaded bytes against the checksum recorded in the
/// manifest. The expected value must be lowercase or uppercase hex; the
/// comparison is case-insensitive.
pub fn verify_hex(data: &[u8], expected: &str) -> Result<()> {
    if hex::decode(expected).is_err() {
        return Err(VerifyError::MalformedChecksum(expected.to_string()));
    }
    let actual = digest_hex(data);
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(VerifyError::Mismatch {
            expected: expected.to_ascii_lowercase(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_matches_one_shot() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");
        assert_eq!(hex::encode(hasher.finalize()), digest_hex(b"hello world"));
    }

    #[test]
    fn known_vector() {
        assert_eq!(
            digest_hex(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn verify_accepts_uppercase() {
        let sum = digest_hex(b"abc").to_ascii_uppercase();
        verify_hex(b"abc", &sum).unwrap();
    }

    #[test]
    fn verify_rejects_tampered_bytes() {
        let sum = digest_hex(b"original");
        let err = verify_hex(b"tampered", &sum).unwrap_err();
        match err {
            VerifyError::Mismatch { expected, actual } => {
                assert_eq!(expected, sum);
                assert_ne!(actual, sum);
            }
            other => panic!("expected Mismatch, got {other:?}"),
        }
    }

    #[test]
    fn verify_rejects_non_hex_checksum() {
        let err = verify_hex(b"data", "not-hex!").unwrap_err();
        assert!(matches!(err, VerifyError::MalformedChecksum(_)));
    }
}
