//! Error types for the chunkvault library
//!
//! This module defines all error types that can occur during chunkvault
//! operations. Errors are designed to be informative and actionable; callers
//! that need to branch on "missing" versus "broken" can match on
//! [`VaultError::ObjectNotFound`] versus [`VaultError::Io`] directly.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the chunkvault library
pub type Result<T> = std::result::Result<T, VaultError>;

/// Main error type for all chunkvault operations
#[derive(Debug, Error)]
pub enum VaultError {
    /// I/O errors during file or store operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Object not found in the content-addressed store
    ///
    /// Surfaced distinctly from [`VaultError::Io`] so callers can branch:
    /// a missing chunk aborts one file's restore, while an unreadable store
    /// aborts the whole run.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Malformed content address (e.g. too short to derive a shard prefix)
    #[error("Invalid object address: {0}")]
    InvalidAddress(String),

    /// A metadata record exists but fails to parse
    #[error("Corrupt metadata record at {path:?}: {reason}")]
    CorruptRecord {
        /// Path of the record file that failed to parse
        path: PathBuf,
        /// Parser error message
        reason: String,
    },

    /// Repository namespaces are missing or unreachable
    #[error("Repository not initialized at path: {0:?}")]
    RepositoryNotInitialized(PathBuf),

    /// Errors during JSON serialization of metadata records
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Walk directory error from walkdir crate
    #[error("Walk directory error")]
    WalkDir(#[from] walkdir::Error),
}

impl VaultError {
    /// Create an invalid-address error with a custom message
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        VaultError::InvalidAddress(msg.into())
    }

    /// Check if this error means "the thing simply isn't there"
    ///
    /// Lets callers branch on a skippable miss without matching every
    /// variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VaultError::ObjectNotFound(_))
    }
}
