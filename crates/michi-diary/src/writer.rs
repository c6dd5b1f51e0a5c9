//! Entry creation.
//!
//! The sequence number is derived from the entries already on disk for the
//! date (count + 1), then the entry is linked into place without clobbering.
//! When another writer claims the same name first, the next sequence is
//! tried, so ids stay unique even though derivation and write are separate
//! steps. Any other filesystem failure is returned as is.

use std::path::Path;

use chrono::{Local, NaiveDate};
use michi_core::EntryId;
use tracing::{debug, info};

use crate::entry::EntryContent;
use crate::errors::{DiaryError, Result};
use crate::render::render_entry;
use crate::store::DiaryStore;

/// Attempts before giving up on finding a free sequence number.
const MAX_ATTEMPTS: u32 = 16;

/// Creates diary entries. Not idempotent: every call creates a new entry.
#[derive(Clone, Debug)]
pub struct DiaryWriter {
    store: DiaryStore,
}

impl DiaryWriter {
    /// Writer into `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            store: DiaryStore::new(dir),
        }
    }

    /// Diary directory.
    pub fn dir(&self) -> &Path {
        self.store.dir()
    }

    /// Create an entry dated today (local time).
    pub fn create_entry(&self, content: &EntryContent) -> Result<EntryId> {
        self.create_entry_on(Local::now().date_naive(), content)
    }

    /// Create an entry dated `date`.
    pub fn create_entry_on(&self, date: NaiveDate, content: &EntryContent) -> Result<EntryId> {
        michi_core::fs::ensure_dir(self.store.dir())?;

        let mut seq = self.store.count_on(date)? + 1;
        for _ in 0..MAX_ATTEMPTS {
            let id = EntryId::new(date, seq);
            let body = render_entry(&id, content);
            match michi_core::fs::write_new_atomic(self.store.dir(), &id.file_name(), &body) {
                Ok(path) => {
                    info!(entry_id = %id, path = %path.display(), "diary entry created");
                    return Ok(id);
                }
                Err(e) if e.is_already_exists() => {
                    debug!(entry_id = %id, "sequence taken by another writer, trying next");
                    seq += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(DiaryError::SequenceExhausted {
            date,
            attempts: MAX_ATTEMPTS,
        })
    }
}
