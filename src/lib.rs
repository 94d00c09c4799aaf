//! # chunkvault - Deduplicating backup engine
//!
//! A backup library that splits files into content-defined chunks,
//! fingerprints each chunk with SHA-256, stores each unique chunk exactly
//! once in a content-addressed object store, and keeps per-file metadata that
//! allows exact reconstruction later.
//!
//! ## Overview
//!
//! Its value over naive copy-based backup:
//!
//! - **Deduplication**: identical chunks are stored once, across files and
//!   across backup runs
//! - **Edit resilience**: chunk boundaries are content-defined, so a local
//!   insertion in a file does not invalidate boundaries for unrelated regions
//! - **Incremental runs**: files with an unchanged modification time are
//!   skipped without re-reading them
//! - **Partial-failure tolerance**: one unreadable file or one missing chunk
//!   never aborts a run
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use chunkvault::{Orchestrator, Repository};
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> chunkvault::Result<()> {
//! // Initialize a repository
//! let repo = Repository::new(PathBuf::from("./vault"));
//! repo.init()?;
//!
//! // Back up a directory tree
//! let mut orchestrator = Orchestrator::new(Repository::open(PathBuf::from("./vault"))?);
//! let summary = orchestrator.run_backup(Path::new("./documents"))?;
//! println!("stored {} new chunks", summary.chunks_stored);
//!
//! // Restore everything, flattened into one directory
//! orchestrator.run_restore(Path::new("./restored"), None)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Data flows one direction during backup: filesystem bytes → [`chunker`] →
//! [`digest`] → [`Repository`]; during restore: repository metadata →
//! repository objects → reassembled file. The [`Orchestrator`] is the only
//! component aware of both directions and of the incremental and
//! partial-failure policies.
//!
//! The chunker and digest engine are stateless value types; the repository is
//! the only shared mutable resource. Everything is single-threaded, blocking
//! I/O; object writes are atomic (temp file + rename), which is what would
//! make a parallel extension safe to race on identical fingerprints.
//!
//! ## On-disk layout
//!
//! ```text
//! <repo_root>/objects/<fp[..2]>/<fp>              raw chunk bytes
//! <repo_root>/metadata/<fp(canonical path)>       JSON FileRecord
//! ```
//!
//! ## Module organization
//!
//! - [`chunker`]: content-defined chunking (Buzhash rolling hash)
//! - [`digest`]: SHA-256 fingerprinting for content addressing
//! - [`repository`]: content-addressed object store and metadata store
//! - [`orchestrator`]: backup and restore pipelines
//! - [`types`]: [`FileRecord`] and operation summaries
//! - [`error`]: error types and handling

pub mod chunker;
pub mod digest;
pub mod error;
pub mod orchestrator;
pub mod repository;
pub mod types;

mod utils;

// Re-export main types for convenience
pub use chunker::{Chunk, Chunker};
pub use error::{Result, VaultError};
pub use orchestrator::Orchestrator;
pub use repository::Repository;
pub use types::{BackupSummary, FileRecord, RepositoryStats, RestoreSummary};
