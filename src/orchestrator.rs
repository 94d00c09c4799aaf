//! Backup and restore pipelines
//!
//! The orchestrator is the only component aware of both data directions. It
//! drives backup (traverse, check-for-change, chunk, fingerprint, dedup-store,
//! persist metadata) and restore (select records, reassemble chunks in order,
//! write files).
//!
//! Failure policy is per-file in both directions: one unreadable source file
//! or one missing chunk is reported and skipped, and the run continues with
//! the remaining files. Only an unreachable repository root aborts a whole
//! run. Chunks already stored for a file whose backup later fails are left in
//! place; unreferenced objects are inert under content addressing and never
//! corrupt anything.

use crate::chunker::Chunker;
use crate::digest;
use crate::error::Result;
use crate::repository::Repository;
use crate::types::{BackupSummary, FileRecord, RestoreSummary};
use crate::utils;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Drives backup and restore against one repository
///
/// Holds the repository handle mutably for the duration of a run; the chunker
/// and digest engine are stateless collaborators.
///
/// # Example
///
/// ```rust,no_run
/// use chunkvault::{Orchestrator, Repository};
/// use std::path::{Path, PathBuf};
///
/// # fn example() -> chunkvault::Result<()> {
/// let repo = Repository::open(PathBuf::from("./vault"))?;
/// let mut orchestrator = Orchestrator::new(repo);
///
/// let summary = orchestrator.run_backup(Path::new("./documents"))?;
/// println!("{} files backed up", summary.files_processed);
///
/// orchestrator.run_restore(Path::new("./restored"), None)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Orchestrator {
    chunker: Chunker,
    repository: Repository,
}

impl Orchestrator {
    /// Create an orchestrator over an opened repository
    pub fn new(repository: Repository) -> Self {
        Self {
            chunker: Chunker::new(),
            repository,
        }
    }

    /// Get the underlying repository
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Back up every regular file under `source_root`
    ///
    /// Walks the source tree recursively. Directories, symlinks, and special
    /// files are skipped without error. A file whose stored record carries the
    /// same modification time as the file on disk is skipped entirely, with no
    /// re-chunking or re-hashing (the incremental fast path). Everything else
    /// is chunked, fingerprinted, dedup-stored, and recorded.
    ///
    /// Per-file failures (open, read, store, record write) are logged and
    /// counted in [`BackupSummary::files_failed`]; the run continues.
    #[instrument(skip(self))]
    pub fn run_backup(&mut self, source_root: &Path) -> Result<BackupSummary> {
        info!("Starting backup of {:?}", source_root);
        let mut summary = BackupSummary::default();

        for entry in walkdir::WalkDir::new(source_root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    summary.files_failed += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let modified = entry
                .metadata()
                .map_err(crate::VaultError::from)
                .and_then(|m| Ok(m.modified()?));
            let current_mod_time = match modified {
                Ok(mtime) => utils::mod_time_ns(mtime),
                Err(e) => {
                    warn!("Skipping {:?}: cannot read metadata: {}", path, e);
                    summary.files_failed += 1;
                    continue;
                }
            };

            match self.repository.get_record(path) {
                Ok(Some(record)) if record.mod_time_ns == current_mod_time => {
                    debug!("Skipping unchanged file {:?}", path);
                    summary.files_skipped += 1;
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    // A corrupt record is repaired by re-backing up the file.
                    warn!("Unreadable record for {:?}, re-processing: {}", path, e);
                }
            }

            match self.backup_file(path, current_mod_time, &mut summary) {
                Ok(()) => summary.files_processed += 1,
                Err(e) => {
                    warn!("Failed to back up {:?}: {}", path, e);
                    summary.files_failed += 1;
                }
            }
        }

        info!(
            "Backup complete: {} processed, {} unchanged, {} failed, {} chunks stored, {} deduplicated",
            summary.files_processed,
            summary.files_skipped,
            summary.files_failed,
            summary.chunks_stored,
            summary.chunks_deduplicated,
        );
        Ok(summary)
    }

    /// Chunk, fingerprint, dedup-store, and record one file
    fn backup_file(
        &mut self,
        path: &Path,
        mod_time_ns: u64,
        summary: &mut BackupSummary,
    ) -> Result<()> {
        debug!("Processing file {:?}", path);
        let file = File::open(path)?;
        let chunks = self.chunker.split(BufReader::new(file))?;

        let mut chunk_hashes = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            summary.bytes_read += chunk.len() as u64;
            let fingerprint = digest::fingerprint(chunk);

            if self.repository.object_exists(&fingerprint)? {
                summary.chunks_deduplicated += 1;
            } else {
                self.repository.store_object(&fingerprint, chunk)?;
                summary.chunks_stored += 1;
            }
            chunk_hashes.push(fingerprint);
        }

        let record = FileRecord {
            original_path: path.to_string_lossy().into_owned(),
            mod_time_ns,
            chunk_hashes,
        };
        self.repository.put_record(path, &record)?;
        Ok(())
    }

    /// Restore backed-up files into `destination_dir`
    ///
    /// With `original_path` given, restores only that file's record; if none
    /// exists, reports "nothing to restore" and returns an empty summary.
    /// With no path, restores every record in the repository.
    ///
    /// Restored files land directly under `destination_dir` by basename; the
    /// original directory structure is flattened. Records with an empty
    /// original path (or one without a basename) are skipped without error.
    ///
    /// A failure retrieving any chunk aborts that file, deletes its partial
    /// output, and moves on; one broken file never blocks the others.
    #[instrument(skip(self))]
    pub fn run_restore(
        &mut self,
        destination_dir: &Path,
        original_path: Option<&Path>,
    ) -> Result<RestoreSummary> {
        let mut summary = RestoreSummary::default();

        let records = match original_path {
            Some(path) => match self.repository.get_record(path)? {
                Some(record) => vec![record],
                None => {
                    info!("Nothing to restore for {:?}", path);
                    return Ok(summary);
                }
            },
            None => self.repository.list_records()?,
        };

        fs::create_dir_all(destination_dir)?;
        info!(
            "Restoring {} record(s) into {:?}",
            records.len(),
            destination_dir
        );

        for record in &records {
            let basename = match Path::new(&record.original_path).file_name() {
                Some(name) if !record.original_path.is_empty() => name.to_owned(),
                _ => {
                    debug!("Skipping record with unusable original path");
                    continue;
                }
            };
            let dest_path = destination_dir.join(basename);

            match self.restore_file(record, &dest_path) {
                Ok(bytes) => {
                    summary.files_restored += 1;
                    summary.bytes_written += bytes;
                }
                Err(e) => {
                    warn!("Failed to restore {:?}: {}", record.original_path, e);
                    // Never leave a partially reassembled file behind.
                    if let Err(cleanup) = fs::remove_file(&dest_path) {
                        if cleanup.kind() != std::io::ErrorKind::NotFound {
                            warn!("Failed to remove partial file {:?}: {}", dest_path, cleanup);
                        }
                    }
                    summary.files_failed += 1;
                }
            }
        }

        info!(
            "Restore complete: {} restored, {} failed, {} bytes written",
            summary.files_restored, summary.files_failed, summary.bytes_written
        );
        Ok(summary)
    }

    /// Reassemble one record's chunks, in recorded order, into `dest_path`
    fn restore_file(&self, record: &FileRecord, dest_path: &Path) -> Result<u64> {
        debug!(
            "Restoring {:?} ({} chunks) to {:?}",
            record.original_path,
            record.chunk_hashes.len(),
            dest_path
        );
        let mut output = File::create(dest_path)?;
        let mut bytes_written = 0u64;

        for fingerprint in &record.chunk_hashes {
            let chunk = self.repository.retrieve_object(fingerprint)?;
            output.write_all(&chunk)?;
            bytes_written += chunk.len() as u64;
        }
        output.flush()?;

        Ok(bytes_written)
    }
}
