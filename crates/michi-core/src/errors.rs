//! Error types shared across crates.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A filesystem operation failed.
///
/// Carries the operation verb and the path it was applied to so callers can
/// surface a useful message without re-deriving context.
#[derive(Debug, Error)]
#[error("failed to {op} {}: {source}", .path.display())]
pub struct FsError {
    /// Operation verb (e.g. "create directory", "persist").
    pub op: &'static str,
    /// Path the operation was applied to.
    pub path: PathBuf,
    /// Underlying I/O error.
    #[source]
    pub source: io::Error,
}

impl FsError {
    /// Wrap an I/O error with operation and path context.
    #[must_use]
    pub fn new(op: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Underlying error kind.
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }

    /// Whether the failure was caused by the target already existing.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        self.kind() == io::ErrorKind::AlreadyExists
    }
}

/// A string did not parse as a dated key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    /// The overall shape was wrong.
    #[error("malformed {kind} key: {input:?}")]
    Malformed {
        /// Expected key kind (`session`, `reflection`).
        kind: &'static str,
        /// Rejected input.
        input: String,
    },
    /// The date component was not a real calendar date.
    #[error("invalid date in {kind} key: {input:?}")]
    InvalidDate {
        /// Expected key kind.
        kind: &'static str,
        /// Rejected input.
        input: String,
    },
    /// Sequence numbers start at 1.
    #[error("sequence must be >= 1 in {kind} key: {input:?}")]
    ZeroSequence {
        /// Expected key kind.
        kind: &'static str,
        /// Rejected input.
        input: String,
    },
}
