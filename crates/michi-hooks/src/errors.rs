//! Hook error types.

use michi_core::FsError;
use thiserror::Error;

/// Errors that can occur while tracking session state.
#[derive(Debug, Error)]
pub enum HookError {
    /// Reading, writing or removing a session record failed.
    #[error(transparent)]
    Io(#[from] FsError),

    /// Encoding a session record failed.
    #[error("failed to encode session state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for hook operations.
pub type Result<T> = std::result::Result<T, HookError>;
