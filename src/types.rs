//! Core data types used throughout the chunkvault library
//!
//! The central type is [`FileRecord`], the persisted description of one
//! backed-up file. The summary types report what a backup or restore run
//! actually did, mirroring what the orchestrator logs.

use serde::{Deserialize, Serialize};

/// Persisted metadata for one backed-up file
///
/// One record exists per distinct original path ever backed up; each backup
/// run that sees the file as new or changed overwrites it. The record holds
/// everything needed to reconstruct the file: the source path, the
/// modification time observed at backup, and the ordered chunk fingerprints.
///
/// The order of `chunk_hashes` is load-bearing: restore replays the
/// fingerprints in exactly this order to reassemble the file.
///
/// Serialized as a JSON document with these three keys; the document
/// round-trips all fields exactly, including the ordered array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// The source path as it was backed up
    pub original_path: String,
    /// Source modification time, nanoseconds since the Unix epoch
    pub mod_time_ns: u64,
    /// Ordered chunk fingerprints, one per chunk, reconstruction order
    pub chunk_hashes: Vec<String>,
}

/// Statistics from a backup run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupSummary {
    /// Files chunked, fingerprinted, and recorded
    pub files_processed: usize,
    /// Files skipped because their modification time was unchanged
    pub files_skipped: usize,
    /// Files skipped because of a per-file error (open/read/store)
    pub files_failed: usize,
    /// Chunks newly written to the object store
    pub chunks_stored: usize,
    /// Chunks that already existed in the object store (dedup hits)
    pub chunks_deduplicated: usize,
    /// Bytes read from processed source files
    pub bytes_read: u64,
}

impl BackupSummary {
    /// Total chunks encountered across all processed files
    pub fn total_chunks(&self) -> usize {
        self.chunks_stored + self.chunks_deduplicated
    }
}

/// Statistics from a restore run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreSummary {
    /// Files fully reassembled at the destination
    pub files_restored: usize,
    /// Files whose restore was aborted and partial output removed
    pub files_failed: usize,
    /// Bytes written to restored files
    pub bytes_written: u64,
}

/// Statistics about a repository's current contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryStats {
    /// Number of unique chunks in the object namespace
    pub object_count: usize,
    /// Total bytes across all stored chunks
    pub total_object_bytes: u64,
    /// Number of file metadata records
    pub record_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_record_round_trip() {
        let record = FileRecord {
            original_path: "/data/report.txt".to_string(),
            mod_time_ns: 1_700_000_000_123_456_789,
            chunk_hashes: vec!["aa11".to_string(), "bb22".to_string(), "cc33".to_string()],
        };

        let json = serde_json::to_string_pretty(&record).unwrap();
        let decoded: FileRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, record);
        // Array order must survive the round trip.
        assert_eq!(decoded.chunk_hashes, record.chunk_hashes);
    }

    #[test]
    fn test_backup_summary_totals() {
        let summary = BackupSummary {
            chunks_stored: 3,
            chunks_deduplicated: 5,
            ..Default::default()
        };
        assert_eq!(summary.total_chunks(), 8);
    }
}
