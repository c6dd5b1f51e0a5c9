//! Atomic file writes.
//!
//! Every mutating write goes through a temporary sibling in the target
//! directory, is flushed to disk, then moved into place in one step.
//! A concurrent reader sees either no file or the complete file. An
//! interrupted write leaves at worst an orphaned `*.tmp` sibling, which the
//! retention sweeper reclaims.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::FsError;

/// Suffix carried by in-flight temporary files.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Write `contents` into a fresh temp sibling of `file_name` inside `dir`.
fn stage(dir: &Path, file_name: &str, contents: &str) -> Result<NamedTempFile, FsError> {
    let prefix = format!(".{file_name}.");
    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| FsError::new("create temp file in", dir, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| FsError::new("write", tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| FsError::new("sync", tmp.path(), e))?;
    Ok(tmp)
}

/// Create `dir` (and parents) if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), FsError> {
    std::fs::create_dir_all(dir).map_err(|e| FsError::new("create directory", dir, e))
}

/// Atomically create `dir/file_name` with `contents`, never overwriting.
///
/// Fails with an [`FsError`] whose kind is `AlreadyExists` when the target
/// is already present; the staged temp file is removed in that case.
pub fn write_new_atomic(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, FsError> {
    ensure_dir(dir)?;
    let target = dir.join(file_name);
    let tmp = stage(dir, file_name, contents)?;
    let _ = tmp
        .persist_noclobber(&target)
        .map_err(|e| FsError::new("persist", &target, e.error))?;
    debug!(path = %target.display(), bytes = contents.len(), "atomically created file");
    Ok(target)
}

/// Atomically replace `path` with `contents`, creating parents if needed.
pub fn replace_atomic(path: &Path, contents: &str) -> Result<(), FsError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(dir)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let tmp = stage(dir, file_name, contents)?;
    let _ = tmp
        .persist(path)
        .map_err(|e| FsError::new("persist", path, e.error))?;
    debug!(path = %path.display(), bytes = contents.len(), "atomically replaced file");
    Ok(())
}
