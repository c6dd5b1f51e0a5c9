//! # michi-diary
//!
//! Diary entries: immutable markdown records of a work session.
//!
//! - [`EntryContent`]: optional sections plus project/branch context
//! - [`DiaryWriter`]: assigns the next `(date, sequence)` id and writes the
//!   entry atomically; never overwrites an existing entry
//! - [`DiaryStore`]: lists entry ids and parses entries back
//! - [`RetentionSweeper`]: deletes entries older than the retention window,
//!   plus stale side-files; never looks at the ledger
//!
//! Entries are never updated in place. The only deletion path is the sweeper.

#![deny(unsafe_code)]

pub mod context;
pub mod entry;
pub mod errors;
pub mod parse;
pub mod render;
pub mod store;
pub mod sweeper;
pub mod writer;

pub use context::EntryContext;
pub use entry::{DiaryEntry, EntryContent, Section};
pub use errors::{DiaryError, Result};
pub use parse::parse_entry;
pub use render::render_entry;
pub use store::DiaryStore;
pub use sweeper::{RetentionSweeper, SweepReport};
pub use writer::DiaryWriter;
