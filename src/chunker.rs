//! Content-defined chunking with a Buzhash rolling hash
//!
//! This module splits byte streams into variable-length chunks at boundaries
//! determined by the data itself rather than by fixed offsets. A sliding
//! window of the last [`WINDOW_SIZE`] bytes is hashed incrementally; when the
//! low bits of the rolling hash are all zero (and the chunk has reached its
//! minimum size), the chunk is cut.
//!
//! Boundary stability is the point of the design: a localized edit that does
//! not touch the window-sized neighborhood of a boundary cannot shift that
//! boundary, so unchanged regions of an edited file re-chunk identically and
//! deduplicate against previously stored chunks.
//!
//! The rolling hash state is deliberately *not* reset at chunk boundaries; it
//! keeps sliding over the full stream, so the window may span a cut. Resetting
//! it would make every boundary depend on the previous one and destroy
//! stability under insertions.

use crate::error::Result;
use std::io::Read;

/// A chunk is an owned, ordered sequence of bytes produced by the chunker
pub type Chunk = Vec<u8>;

/// Minimum chunk length; no content-defined cut happens before this
pub const MIN_CHUNK_SIZE: usize = 2 * 1024;

/// Target average chunk length
pub const AVG_CHUNK_SIZE: usize = 8 * 1024;

/// Hard ceiling on chunk length; a cut is forced here regardless of content
pub const MAX_CHUNK_SIZE: usize = 32 * 1024;

/// Width of the sliding window, independent of the chunk-size constants
pub const WINDOW_SIZE: usize = 48;

/// Mask applied to the rolling hash at each byte; a cut fires when the
/// masked bits are all zero. Derived from the average so the expected run
/// length between matches equals `AVG_CHUNK_SIZE` (mask width = log2(avg)).
pub const CUT_MASK: u32 = (AVG_CHUNK_SIZE as u32) - 1;

// The mask derivation above only holds for a power-of-two average.
const _: () = assert!(AVG_CHUNK_SIZE.is_power_of_two());
const _: () = assert!(MIN_CHUNK_SIZE <= AVG_CHUNK_SIZE && AVG_CHUNK_SIZE <= MAX_CHUNK_SIZE);

/// Read buffer size for pulling bytes off the source stream
const READ_BUFFER_SIZE: usize = 4096;

/// Per-byte-value pseudo-random table for the Buzhash
///
/// Generated at compile time from a fixed seed via splitmix64. The table is
/// part of the chunk-boundary behavior: changing it re-cuts every stream, so
/// existing repositories would stop deduplicating against new backups.
static HASH_TABLE: [u32; 256] = build_hash_table();

const fn build_hash_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut state: u64 = 0x6a09_e667_f3bc_c908;
    let mut i = 0;
    while i < 256 {
        // splitmix64 step
        state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        table[i] = (z >> 32) as u32;
        i += 1;
    }
    table
}

/// Buzhash over a fixed-width sliding window
///
/// Each update is O(1): the accumulated hash is rotated one bit, the table
/// value for the incoming byte is XORed in, and the (appropriately rotated)
/// table value for the byte leaving the window is XORed out. The window is an
/// explicit fixed-capacity circular buffer; the hash is never recomputed from
/// scratch.
#[derive(Debug)]
struct RollingHash {
    window: [u8; WINDOW_SIZE],
    filled: usize,
    pos: usize,
    hash: u32,
}

impl RollingHash {
    /// A byte that entered the window `WINDOW_SIZE` updates ago has had its
    /// table value rotated this far; rotations on u32 wrap mod 32.
    const OUT_ROTATE: u32 = (WINDOW_SIZE % 32) as u32;

    fn new() -> Self {
        Self {
            window: [0u8; WINDOW_SIZE],
            filled: 0,
            pos: 0,
            hash: 0,
        }
    }

    /// Slide the window forward one byte and return the updated hash
    #[inline]
    fn roll(&mut self, byte: u8) -> u32 {
        self.hash = self.hash.rotate_left(1) ^ HASH_TABLE[byte as usize];
        if self.filled == WINDOW_SIZE {
            let outgoing = self.window[self.pos];
            self.hash ^= HASH_TABLE[outgoing as usize].rotate_left(Self::OUT_ROTATE);
        } else {
            self.filled += 1;
        }
        self.window[self.pos] = byte;
        self.pos = (self.pos + 1) % WINDOW_SIZE;
        self.hash
    }
}

/// Content-defined chunker
///
/// Stateless between calls; the chunking constants are fixed at compile time
/// so every run of the same stream yields byte-identical chunks. Implemented
/// as a small value type rather than holding any configuration or storage
/// references.
///
/// # Example
///
/// ```rust
/// use chunkvault::chunker::Chunker;
///
/// let data = vec![7u8; 1000];
/// let chunks = Chunker::new().split(&data[..]).unwrap();
/// assert_eq!(chunks.len(), 1);
/// assert_eq!(chunks[0].len(), 1000);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Chunker;

impl Chunker {
    /// Create a new chunker
    pub fn new() -> Self {
        Self
    }

    /// Split a byte stream into an ordered sequence of content-defined chunks
    ///
    /// The stream is consumed exactly once, in order. For each incoming byte
    /// the byte is appended to the chunk being built, the rolling hash is
    /// advanced, and then a cut decision is made:
    ///
    /// - at `MAX_CHUNK_SIZE` the cut is forced regardless of the hash;
    /// - from `MIN_CHUNK_SIZE` onward, a cut fires when
    ///   `(hash & CUT_MASK) == 0`;
    /// - otherwise the chunk keeps accumulating.
    ///
    /// A cut emits the accumulated chunk including the triggering byte. Any
    /// bytes left at end of stream become a final chunk that may be shorter
    /// than `MIN_CHUNK_SIZE`. An empty stream yields zero chunks.
    ///
    /// # Errors
    ///
    /// Only read failures from `reader` surface, as [`crate::VaultError::Io`];
    /// the cut logic itself cannot fail.
    pub fn split<R: Read>(&self, mut reader: R) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        let mut current: Chunk = Vec::with_capacity(AVG_CHUNK_SIZE);
        let mut rolling = RollingHash::new();
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }

            for &byte in &buffer[..bytes_read] {
                current.push(byte);
                let hash = rolling.roll(byte);

                let should_cut = if current.len() >= MAX_CHUNK_SIZE {
                    true
                } else {
                    current.len() >= MIN_CHUNK_SIZE && hash & CUT_MASK == 0
                };

                if should_cut {
                    chunks.push(std::mem::replace(
                        &mut current,
                        Vec::with_capacity(AVG_CHUNK_SIZE),
                    ));
                }
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Find a byte value whose steady-state window hash never matches the
    /// cut mask, so runs of it only ever cut at the hard ceiling.
    fn non_cutting_byte() -> u8 {
        let chunker = Chunker::new();
        (0u16..=255)
            .map(|b| b as u8)
            .find(|&b| {
                let data = vec![b; MAX_CHUNK_SIZE];
                chunker.split(&data[..]).unwrap().len() == 1
            })
            .expect("some byte value never triggers a content-defined cut")
    }

    #[test]
    fn test_empty_stream_yields_no_chunks() {
        let chunks = Chunker::new().split(&[][..]).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_short_stream_is_one_chunk() {
        // Below MIN_CHUNK_SIZE no cut can fire; everything flushes at EOF.
        let data = vec![0xAB; 1024];
        let chunks = Chunker::new().split(&data[..]).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 1024);
    }

    #[test]
    fn test_hard_ceiling() {
        let byte = non_cutting_byte();
        let data = vec![byte; MAX_CHUNK_SIZE + 100];
        let chunks = Chunker::new().split(&data[..]).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), MAX_CHUNK_SIZE);
        assert_eq!(chunks[1].len(), 100);
    }

    #[test]
    fn test_chunks_reassemble_to_input() {
        let mut rng = StdRng::seed_from_u64(7);
        let data: Vec<u8> = (0..200_000).map(|_| rng.random()).collect();

        let chunks = Chunker::new().split(&data[..]).unwrap();
        assert!(chunks.len() > 1, "random data this size should cut");

        let reassembled: Vec<u8> = chunks.concat();
        assert_eq!(reassembled, data);

        for chunk in &chunks {
            assert!(!chunk.is_empty());
            assert!(chunk.len() <= MAX_CHUNK_SIZE);
        }
        // Every chunk except the trailing flush respects the minimum.
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.len() >= MIN_CHUNK_SIZE);
        }
    }

    #[test]
    fn test_determinism() {
        let mut rng = StdRng::seed_from_u64(42);
        let data: Vec<u8> = (0..100_000).map(|_| rng.random()).collect();

        let first = Chunker::new().split(&data[..]).unwrap();
        let second = Chunker::new().split(&data[..]).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(first, second);
    }

    #[test]
    fn test_rolling_hash_matches_recomputation() {
        // The O(1) update must agree with hashing the window from scratch.
        let mut rng = StdRng::seed_from_u64(3);
        let data: Vec<u8> = (0..1000).map(|_| rng.random()).collect();

        let mut rolling = RollingHash::new();
        for (i, &byte) in data.iter().enumerate() {
            let hash = rolling.roll(byte);
            if i + 1 >= WINDOW_SIZE {
                let window = &data[i + 1 - WINDOW_SIZE..=i];
                let mut expected = 0u32;
                for &b in window {
                    expected = expected.rotate_left(1) ^ HASH_TABLE[b as usize];
                }
                assert_eq!(hash, expected, "divergence at offset {}", i);
            }
        }
    }
}
