//! Content-addressed repository for chunks and file metadata
//!
//! The repository owns two disjoint namespaces under one root directory:
//!
//! ```text
//! <repo_root>/
//! ├── objects/           # content-addressed chunks (sharded)
//! │   └── <fp[..2]>/     # first two hex chars of the fingerprint
//! │       └── <fp>       # raw chunk bytes
//! └── metadata/          # one FileRecord per original path
//!     └── <fingerprint of canonicalized original path>
//! ```
//!
//! Objects are keyed by the SHA-256 fingerprint of their content and stored
//! under a two-level sharded layout so no single directory grows unbounded.
//! Object storage is write-once-idempotent: re-storing a fingerprint that
//! already exists is a no-op, because content addressing guarantees the bytes
//! are equal.
//!
//! Metadata records are keyed by fingerprinting the canonicalized original
//! path, reusing the chunk digest rather than introducing a second hash
//! family. Records are overwritten on each backup of their path.
//!
//! All writes go through a temporary file followed by an atomic rename, so a
//! reader can never observe a partially written object or record. This is an
//! explicit contract of the storage primitive: it is what makes concurrent
//! stores of the same fingerprint safe to race in a future parallel pipeline.

use crate::digest;
use crate::error::{Result, VaultError};
use crate::types::{FileRecord, RepositoryStats};
use crate::utils;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, trace};

/// Length of the shard prefix taken from a fingerprint
const SHARD_PREFIX_LEN: usize = 2;

/// On-disk content-addressed store for chunks and file records
///
/// # Example
///
/// ```rust,no_run
/// use chunkvault::Repository;
/// use std::path::PathBuf;
///
/// # fn example() -> chunkvault::Result<()> {
/// let repo = Repository::new(PathBuf::from("./vault"));
/// repo.init()?;
///
/// let data = b"chunk bytes";
/// let fp = chunkvault::digest::fingerprint(data);
/// repo.store_object(&fp, data)?;
/// assert!(repo.object_exists(&fp)?);
/// assert_eq!(repo.retrieve_object(&fp)?, data);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Repository {
    /// Root directory holding both namespaces
    root: PathBuf,
}

impl Repository {
    /// Create a repository handle for the given root
    ///
    /// Performs no I/O; call [`Repository::init`] to create the namespaces or
    /// [`Repository::open`] to require that they already exist.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Establish the object and metadata namespaces
    ///
    /// Idempotent: safe to call on an already-initialized repository.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.root.join("objects"))?;
        fs::create_dir_all(self.root.join("metadata"))?;
        info!("Initialized repository at {:?}", self.root);
        Ok(())
    }

    /// Open an existing repository, verifying both namespaces are present
    ///
    /// # Errors
    ///
    /// [`VaultError::RepositoryNotInitialized`] if either namespace is
    /// missing. This is the one whole-run fatal condition: nothing else can
    /// proceed without a reachable repository root.
    pub fn open(root: PathBuf) -> Result<Self> {
        if !root.join("objects").is_dir() || !root.join("metadata").is_dir() {
            return Err(VaultError::RepositoryNotInitialized(root));
        }
        debug!("Opened repository at {:?}", root);
        Ok(Self { root })
    }

    /// Get the repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    // --- Object namespace ---

    /// Check whether a chunk exists in the object store
    ///
    /// Never fails for a missing object; returns `false` instead. An
    /// unreadable address still surfaces as [`VaultError::InvalidAddress`].
    pub fn object_exists(&self, fingerprint: &str) -> Result<bool> {
        Ok(self.object_path(fingerprint)?.exists())
    }

    /// Store a chunk under its fingerprint
    ///
    /// Idempotent: if an object already exists at this address the call is a
    /// no-op, since content addressing guarantees the stored bytes equal
    /// `data`. Otherwise the chunk is written to a temporary file in the
    /// shard directory and atomically renamed into place.
    pub fn store_object(&self, fingerprint: &str, data: &[u8]) -> Result<()> {
        let object_path = self.object_path(fingerprint)?;
        if object_path.exists() {
            trace!("Object {} already stored, skipping", fingerprint);
            return Ok(());
        }

        let shard_dir = object_path
            .parent()
            .expect("sharded object path always has a parent");
        fs::create_dir_all(shard_dir)?;

        let mut temp = NamedTempFile::new_in(shard_dir)?;
        temp.write_all(data)?;
        temp.persist(&object_path).map_err(|e| e.error)?;

        trace!("Stored object {} ({} bytes)", fingerprint, data.len());
        Ok(())
    }

    /// Retrieve a chunk's bytes by fingerprint
    ///
    /// # Errors
    ///
    /// - [`VaultError::ObjectNotFound`] if no object exists at this address
    /// - [`VaultError::Io`] if the object file cannot be read
    pub fn retrieve_object(&self, fingerprint: &str) -> Result<Vec<u8>> {
        let object_path = self.object_path(fingerprint)?;
        if !object_path.exists() {
            return Err(VaultError::ObjectNotFound(fingerprint.to_string()));
        }
        Ok(fs::read(object_path)?)
    }

    /// Count the objects currently in the store
    ///
    /// Walks the shard directories; used by statistics reporting and by tests
    /// asserting dedup idempotence.
    pub fn object_count(&self) -> Result<usize> {
        let mut count = 0;
        for shard in fs::read_dir(self.root.join("objects"))? {
            let shard = shard?;
            if shard.path().is_dir() {
                count += fs::read_dir(shard.path())?.count();
            }
        }
        Ok(count)
    }

    /// Sharded path for an object: `objects/<fp[..2]>/<fp>`
    ///
    /// Rejects fingerprints too short to derive a shard prefix, and non-ASCII
    /// input that could not be a hex digest at all.
    fn object_path(&self, fingerprint: &str) -> Result<PathBuf> {
        if fingerprint.len() < SHARD_PREFIX_LEN || !fingerprint.is_ascii() {
            return Err(VaultError::invalid_address(format!(
                "fingerprint too short to shard: {:?}",
                fingerprint
            )));
        }
        let (prefix, _) = fingerprint.split_at(SHARD_PREFIX_LEN);
        Ok(self.root.join("objects").join(prefix).join(fingerprint))
    }

    // --- Metadata namespace ---

    /// Store the record for an original path, replacing any previous one
    pub fn put_record(&self, original_path: &Path, record: &FileRecord) -> Result<()> {
        let record_path = self.record_path(original_path);
        let json = serde_json::to_string_pretty(record)?;

        let metadata_dir = self.root.join("metadata");
        let mut temp = NamedTempFile::new_in(&metadata_dir)?;
        temp.write_all(json.as_bytes())?;
        temp.persist(&record_path).map_err(|e| e.error)?;

        debug!("Stored record for {:?}", original_path);
        Ok(())
    }

    /// Look up the record for an original path
    ///
    /// Returns `Ok(None)` when no record exists yet; absence is not an error.
    ///
    /// # Errors
    ///
    /// [`VaultError::CorruptRecord`] if a record exists but fails to parse.
    pub fn get_record(&self, original_path: &Path) -> Result<Option<FileRecord>> {
        let record_path = self.record_path(original_path);
        if !record_path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::read_record(&record_path)?))
    }

    /// Enumerate every record currently stored, order unspecified
    pub fn list_records(&self) -> Result<Vec<FileRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(self.root.join("metadata"))? {
            let entry = entry?;
            if entry.path().is_file() {
                records.push(Self::read_record(&entry.path())?);
            }
        }
        Ok(records)
    }

    /// Gather object and record counts plus total stored bytes
    pub fn stats(&self) -> Result<RepositoryStats> {
        let mut stats = RepositoryStats::default();

        for shard in fs::read_dir(self.root.join("objects"))? {
            let shard = shard?;
            if shard.path().is_dir() {
                for object in fs::read_dir(shard.path())? {
                    let object = object?;
                    stats.object_count += 1;
                    stats.total_object_bytes += object.metadata()?.len();
                }
            }
        }

        stats.record_count = fs::read_dir(self.root.join("metadata"))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .count();

        Ok(stats)
    }

    /// Metadata path for an original file path
    ///
    /// The key is the fingerprint of the canonicalized path string, so two
    /// spellings of the same logical path share one record.
    fn record_path(&self, original_path: &Path) -> PathBuf {
        let canonical = utils::canonicalize_path(original_path);
        let key = digest::fingerprint(canonical.to_string_lossy().as_bytes());
        self.root.join("metadata").join(key)
    }

    fn read_record(record_path: &Path) -> Result<FileRecord> {
        let text = fs::read_to_string(record_path)?;
        serde_json::from_str(&text).map_err(|e| VaultError::CorruptRecord {
            path: record_path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
