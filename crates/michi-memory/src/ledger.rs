//! The processed-entry ledger.
//!
//! On disk: one entry id per line, in processing order, append-only. The
//! file is never rewritten; each id is appended with its own small write so
//! concurrent appenders can interleave lines but never split one.
//!
//! In memory: a set, so duplicate lines are harmless.

use std::collections::{BTreeSet, HashSet};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use michi_core::{EntryId, FsError};
use tracing::{debug, warn};

/// Entry ids known to be processed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessedSet {
    ids: HashSet<EntryId>,
}

impl ProcessedSet {
    /// Whether `id` has been processed.
    pub fn contains(&self, id: &EntryId) -> bool {
        self.ids.contains(id)
    }

    /// Distinct processed ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing has been processed.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Parse ledger text. Lines holding a path to an entry file (written by
    /// older tools) resolve to that file's id; anything else is skipped.
    pub fn parse(text: &str) -> Self {
        let mut ids = HashSet::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let id = line.parse::<EntryId>().ok().or_else(|| {
                Path::new(line)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(EntryId::from_file_name)
            });
            match id {
                Some(id) => {
                    let _ = ids.insert(id);
                }
                None => debug!(line, "skipping unrecognized ledger line"),
            }
        }
        Self { ids }
    }
}

impl FromIterator<EntryId> for ProcessedSet {
    fn from_iter<I: IntoIterator<Item = EntryId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Entries in `diary_ids` that are not in `processed`, ascending and
/// deduplicated.
pub fn unprocessed(diary_ids: &[EntryId], processed: &ProcessedSet) -> Vec<EntryId> {
    diary_ids
        .iter()
        .filter(|id| !processed.contains(id))
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Handle on the ledger file.
#[derive(Clone, Debug)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Ledger stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ledger file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the processed set. A missing or unreadable ledger is empty.
    pub fn load(&self) -> ProcessedSet {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => ProcessedSet::parse(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => ProcessedSet::default(),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ledger unreadable, treating every entry as unprocessed"
                );
                ProcessedSet::default()
            }
        }
    }

    /// Append `ids` in the given order, one line each.
    ///
    /// Existing lines are never touched; marking an id twice lists it twice.
    pub fn mark_processed(&self, ids: &[EntryId]) -> Result<(), FsError> {
        if ids.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            michi_core::fs::ensure_dir(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| FsError::new("open", &self.path, e))?;
        for id in ids {
            file.write_all(format!("{id}\n").as_bytes())
                .map_err(|e| FsError::new("append to", &self.path, e))?;
        }
        file.sync_data()
            .map_err(|e| FsError::new("sync", &self.path, e))?;
        debug!(path = %self.path.display(), count = ids.len(), "marked entries processed");
        Ok(())
    }
}
