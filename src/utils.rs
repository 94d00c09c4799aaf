//! Utility functions for chunkvault
//!
//! Path canonicalization and modification-time helpers shared by the
//! repository and orchestrator.

use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Canonicalize a path to a stable normal form
///
/// Two different textual spellings of the same logical path must map to the
/// same string, because the repository derives metadata keys by fingerprinting
/// it. Resolution is "weak": if the path exists, the filesystem's canonical
/// form (symlinks resolved) is used; otherwise the path is made absolute
/// against the current directory and `.`/`..` segments are folded lexically.
pub fn canonicalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Modification time as nanoseconds since the Unix epoch
///
/// Pre-epoch timestamps clamp to zero rather than failing; they compare
/// unequal to any real modification time, which just disables the
/// incremental fast path for that file.
pub fn mod_time_ns(mtime: SystemTime) -> u64 {
    mtime
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos().min(u64::MAX as u128) as u64)
        .unwrap_or(0)
}
