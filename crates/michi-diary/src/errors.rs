//! Diary error types.

use chrono::NaiveDate;
use michi_core::FsError;
use thiserror::Error;

use crate::sweeper::SweepReport;

/// Errors from writing, reading or sweeping diary entries.
#[derive(Debug, Error)]
pub enum DiaryError {
    /// Filesystem failure (directory creation, write, rename, delete).
    #[error(transparent)]
    Io(#[from] FsError),
    /// Concurrent writers kept claiming the sequence numbers we tried.
    #[error("no free sequence number for {date} after {attempts} attempts")]
    SequenceExhausted {
        /// Date the entry was being written for.
        date: NaiveDate,
        /// Attempts made.
        attempts: u32,
    },
    /// A sweep ran to the end but some files or directories could not be
    /// examined or deleted. `report` counts what was deleted.
    #[error("retention sweep incomplete, {failed} operation(s) failed; first: {first}")]
    SweepIncomplete {
        /// Deletions that did happen.
        report: SweepReport,
        /// Failed operations.
        failed: usize,
        /// First failure encountered.
        #[source]
        first: FsError,
    },
}

impl DiaryError {
    /// Whether the error is a missing file or directory.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Deletions completed by a sweep that failed part way.
    #[must_use]
    pub fn partial_report(&self) -> Option<SweepReport> {
        match self {
            Self::SweepIncomplete { report, .. } => Some(*report),
            _ => None,
        }
    }
}

/// Result type for diary operations.
pub type Result<T> = std::result::Result<T, DiaryError>;
