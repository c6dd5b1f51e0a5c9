//! Memory error types.

use chrono::NaiveDate;
use michi_core::FsError;
use michi_diary::DiaryError;
use thiserror::Error;

/// Errors from a reflection pass.
///
/// "No unprocessed entries" is not an error; see
/// [`PassOutcome::NothingToDo`](crate::reflector::PassOutcome::NothingToDo).
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Listing or reading diary entries failed.
    #[error("diary access failed: {0}")]
    Diary(#[from] DiaryError),
    /// Appending to the ledger failed.
    #[error("ledger write failed: {0}")]
    Ledger(#[source] FsError),
    /// Writing the reflection file failed.
    #[error("reflection write failed: {0}")]
    Reflection(#[source] FsError),
    /// Concurrent passes kept claiming the reflection ids we tried.
    #[error("no free reflection sequence for {date} after {attempts} attempts")]
    SequenceExhausted {
        /// Date of the reflection.
        date: NaiveDate,
        /// Attempts made.
        attempts: u32,
    },
}

/// Result type for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
