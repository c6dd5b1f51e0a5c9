//! Read access to the diary directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use michi_core::{EntryId, FsError};
use tracing::debug;

use crate::entry::DiaryEntry;
use crate::errors::Result;
use crate::parse::parse_entry;

/// The diary directory: one `<entry-id>.md` per entry.
#[derive(Clone, Debug)]
pub struct DiaryStore {
    dir: PathBuf,
}

impl DiaryStore {
    /// Store over `dir`. The directory need not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Diary directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an entry is stored at.
    pub fn path_of(&self, id: &EntryId) -> PathBuf {
        self.dir.join(id.file_name())
    }

    /// All entry ids on disk, ascending. A missing directory is empty.
    ///
    /// Files whose names are not `<entry-id>.md` are ignored.
    pub fn list(&self) -> Result<Vec<EntryId>> {
        let read_dir = match std::fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "diary directory missing, no entries");
                return Ok(Vec::new());
            }
            Err(e) => return Err(FsError::new("list", &self.dir, e).into()),
        };

        let mut ids = Vec::new();
        for dirent in read_dir {
            let dirent = dirent.map_err(|e| FsError::new("list", &self.dir, e))?;
            if let Some(id) = dirent.file_name().to_str().and_then(EntryId::from_file_name) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Number of entries dated `date`.
    pub fn count_on(&self, date: NaiveDate) -> Result<u32> {
        let count = self.list()?.iter().filter(|id| id.date() == date).count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Read and parse one entry.
    pub fn read(&self, id: &EntryId) -> Result<DiaryEntry> {
        let path = self.path_of(id);
        let text = std::fs::read_to_string(&path).map_err(|e| FsError::new("read", &path, e))?;
        Ok(DiaryEntry {
            id: *id,
            content: parse_entry(&text),
        })
    }
}
