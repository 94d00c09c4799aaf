//! Cryptographic fingerprinting for content addressing
//!
//! Every chunk stored in the repository is named by the SHA-256 digest of its
//! content, hex-encoded lowercase. The same digest keys the metadata store
//! (applied to a canonicalized path string), so there is exactly one hash
//! family in the system.
//!
//! Fingerprints are compared for equality across runs and across
//! implementations, so exact reproducibility matters; the functions here are
//! total and testable against published SHA-256 vectors.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::io::Read;

/// Compute the fingerprint of a byte sequence
///
/// Returns the SHA-256 digest of `data` as a 64-character lowercase
/// hexadecimal string. Deterministic: identical bytes always yield an
/// identical fingerprint, including for empty input.
///
/// # Example
///
/// ```rust
/// let fp = chunkvault::digest::fingerprint(b"hello world");
/// assert_eq!(fp.len(), 64);
/// ```
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute the fingerprint of a reader's full contents
///
/// Streams the reader through the hasher in 8 KB slices so large inputs are
/// never held in memory whole. Read failures propagate as
/// [`crate::VaultError::Io`]; the hashing itself cannot fail.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_known_vector() {
        // Published SHA-256 of the empty string.
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hello_world_known_vector() {
        // Published SHA-256 of "hello world".
        assert_eq!(
            fingerprint(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_determinism() {
        let data = b"some arbitrary bytes";
        assert_eq!(fingerprint(data), fingerprint(data));
    }

    #[test]
    fn test_reader_matches_slice() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let from_reader = fingerprint_reader(&data[..]).unwrap();
        assert_eq!(from_reader, fingerprint(&data));
    }
}
