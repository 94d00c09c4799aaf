//! Property-based testing for the chunker
//!
//! Uses proptest for invariants over arbitrary inputs, plus seeded randomized
//! checks of the boundary-stability property that the whole deduplication
//! design rests on.

use chunkvault::chunker::{Chunker, AVG_CHUNK_SIZE, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use chunkvault::digest;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random()).collect()
}

proptest! {
    /// Chunking is a pure function of the input bytes.
    #[test]
    fn prop_chunking_is_deterministic(data in prop::collection::vec(any::<u8>(), 0..65536)) {
        let chunker = Chunker::new();
        let first = chunker.split(&data[..]).unwrap();
        let second = chunker.split(&data[..]).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Chunks concatenate back to the exact input and respect size bounds.
    #[test]
    fn prop_chunks_partition_input(data in prop::collection::vec(any::<u8>(), 0..131072)) {
        let chunks = Chunker::new().split(&data[..]).unwrap();

        if data.is_empty() {
            prop_assert!(chunks.is_empty());
        } else {
            prop_assert_eq!(chunks.concat(), data);
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.len() <= MAX_CHUNK_SIZE);
            }
            // Only the trailing flush may undercut the minimum.
            for chunk in &chunks[..chunks.len() - 1] {
                prop_assert!(chunk.len() >= MIN_CHUNK_SIZE);
            }
        }
    }

    /// Fingerprinting a chunk twice always agrees.
    #[test]
    fn prop_fingerprint_deterministic(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(digest::fingerprint(&data), digest::fingerprint(&data));
    }
}

/// The defining dedup-correctness property: an insertion far from a region
/// must not shift that region's chunk boundaries. The final chunk of the
/// stream is pure suffix content in both the original and the edited stream,
/// so it must fingerprint identically in both.
#[test]
fn test_boundary_stability_under_insertion() {
    let chunker = Chunker::new();
    let suffix_len = 16 * AVG_CHUNK_SIZE;

    for seed in 0..20u64 {
        let prefix = random_bytes(seed * 3 + 1, 8 * AVG_CHUNK_SIZE);
        let insertion = random_bytes(seed * 3 + 2, 512);
        let suffix = random_bytes(seed * 3 + 3, suffix_len);

        let mut original = prefix.clone();
        original.extend_from_slice(&suffix);

        let mut edited = prefix;
        edited.extend_from_slice(&insertion);
        edited.extend_from_slice(&suffix);

        let original_chunks = chunker.split(&original[..]).unwrap();
        let edited_chunks = chunker.split(&edited[..]).unwrap();
        let suffix_chunks = chunker.split(&suffix[..]).unwrap();

        let last_original = digest::fingerprint(original_chunks.last().unwrap());
        let last_edited = digest::fingerprint(edited_chunks.last().unwrap());
        let last_suffix = digest::fingerprint(suffix_chunks.last().unwrap());

        assert_eq!(
            last_original, last_edited,
            "seed {}: insertion shifted the final boundary",
            seed
        );
        assert_eq!(
            last_original, last_suffix,
            "seed {}: final chunk not pure suffix content",
            seed
        );
    }
}

/// Under the same edit, most chunk fingerprints are shared between the
/// original and edited streams; only the insertion neighborhood re-cuts.
#[test]
fn test_insertion_preserves_most_chunks() {
    let chunker = Chunker::new();

    for seed in 100..110u64 {
        let prefix = random_bytes(seed * 2, 10 * AVG_CHUNK_SIZE);
        let suffix = random_bytes(seed * 2 + 1, 10 * AVG_CHUNK_SIZE);
        let insertion = random_bytes(seed, 128);

        let mut original = prefix.clone();
        original.extend_from_slice(&suffix);
        let mut edited = prefix;
        edited.extend_from_slice(&insertion);
        edited.extend_from_slice(&suffix);

        let original_fps: std::collections::HashSet<String> = chunker
            .split(&original[..])
            .unwrap()
            .iter()
            .map(|c| digest::fingerprint(c))
            .collect();
        let edited_chunks = chunker.split(&edited[..]).unwrap();

        let shared = edited_chunks
            .iter()
            .filter(|c| original_fps.contains(&digest::fingerprint(c)))
            .count();

        assert!(
            shared * 2 > edited_chunks.len(),
            "seed {}: only {}/{} chunks survived a 128-byte insertion",
            seed,
            shared,
            edited_chunks.len()
        );
    }
}
