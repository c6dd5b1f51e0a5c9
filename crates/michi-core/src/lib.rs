//! # michi-core
//!
//! Foundation types shared by every michi-mem crate:
//!
//! - **Dated keys**: [`EntryId`] and [`ReflectionId`], `(date, sequence)`
//!   composite keys rendered as `YYYY-MM-DD_<kind>_NNN`
//! - **Storage layout**: [`MemPaths`] resolves the root directory and the
//!   well-known files beneath it
//! - **Atomic writes**: [`fs::write_new_atomic`] and [`fs::replace_atomic`]
//!   (temp sibling, then link/rename into place)
//! - **Errors**: [`FsError`] carries the failed operation and path

#![deny(unsafe_code)]

pub mod errors;
pub mod fs;
pub mod ids;
pub mod paths;

pub use errors::{FsError, KeyParseError};
pub use ids::{EntryId, ReflectionId};
pub use paths::MemPaths;
