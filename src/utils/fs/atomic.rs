//! Atomic file replacement using a sibling temp file and rename.
//!
//! The temp file is created in the target's own directory so the final
//! rename never crosses a filesystem boundary. Readers of the target path see
//! either the old content or the new content, never a partial write.

use crate::core::{Result, UpdaterError};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Atomically replaces `path` with `content`.
///
/// 1. Writes `content` to a temp file next to `path`
/// 2. Copies the permissions of the existing file, if any
/// 3. Syncs the temp file to disk
/// 4. Renames it over `path`
///
/// If any step fails the temp file is removed and `path` is untouched.
///
/// # Errors
///
/// Returns [`UpdaterError::Io`] naming the failing step.
///
/// # Examples
///
/// ```rust,no_run
/// use tmpl_resources::utils::fs::atomic_replace;
/// use std::path::Path;
///
/// # fn example() -> tmpl_resources::core::Result<()> {
/// atomic_replace(Path::new("mytool.tmpl"), b"#---START-RESOURCES---\n#---END-RESOURCES---\n")?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_replace(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".tmpl-resources")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| UpdaterError::io("stage replacement for", path, e))?;

    staged.write_all(content).map_err(|e| UpdaterError::io("write staged copy of", path, e))?;

    if let Ok(metadata) = fs::metadata(path) {
        staged
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| UpdaterError::io("copy permissions onto staged copy of", path, e))?;
    }

    staged.as_file().sync_all().map_err(|e| UpdaterError::io("sync staged copy of", path, e))?;

    staged.persist(path).map_err(|e| UpdaterError::io("replace", path, e.error))?;
    tracing::debug!(target: "fs", "Atomically replaced {}", path.display());

    Ok(())
}

/// Hex-encoded SHA-256 digest of `content`.
#[must_use]
pub fn checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
