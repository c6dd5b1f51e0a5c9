//! The reflection pass.
//!
//! Selects unprocessed entries, analyzes them, writes one reflection, and
//! marks the analyzed entries processed. The ledger is appended only after
//! the reflection file is durable: a crash in between re-analyzes the same
//! entries on the next pass instead of losing them.

use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use michi_core::{EntryId, FsError, MemPaths};
use michi_diary::{DiaryEntry, DiaryStore};
use serde::Serialize;
use tracing::{info, warn};

use crate::analyzer::analyze;
use crate::errors::{MemoryError, Result};
use crate::ledger::{Ledger, unprocessed};
use crate::reflection::{Reflection, ReflectionWriter};

/// Pending work relative to the auto-reflect threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ReflectStatus {
    /// Diary entries not yet reflected upon.
    pub pending: usize,
    /// Configured auto-reflect threshold.
    pub threshold: u32,
    /// Whether `pending` has reached the threshold.
    pub should_reflect: bool,
}

/// A reflection that was written, and whether its entries got marked.
#[derive(Debug)]
pub struct ReflectionPass {
    /// The reflection.
    pub reflection: Reflection,
    /// Where it was written.
    pub path: PathBuf,
    /// Outcome of appending the analyzed ids to the ledger. On `Err` the
    /// entries stay unprocessed until [`Reflector::mark_processed`] succeeds.
    pub marking: std::result::Result<(), FsError>,
}

impl ReflectionPass {
    /// Whether the ledger now lists every analyzed entry.
    pub fn is_recorded(&self) -> bool {
        self.marking.is_ok()
    }
}

/// Result of [`Reflector::run`].
#[derive(Debug)]
pub enum PassOutcome {
    /// Every entry was already processed (or none exist).
    NothingToDo,
    /// A reflection was written.
    Reflected(ReflectionPass),
}

/// Runs reflection passes over one memory root.
#[derive(Clone, Debug)]
pub struct Reflector {
    diary: DiaryStore,
    ledger: Ledger,
    reflections: ReflectionWriter,
}

impl Reflector {
    /// Reflector over the standard layout under `paths`.
    pub fn new(paths: &MemPaths) -> Self {
        Self::from_parts(
            DiaryStore::new(paths.diary_dir()),
            Ledger::new(paths.ledger_path()),
            ReflectionWriter::new(paths.reflections_dir()),
        )
    }

    /// Reflector over explicit components.
    pub fn from_parts(diary: DiaryStore, ledger: Ledger, reflections: ReflectionWriter) -> Self {
        Self {
            diary,
            ledger,
            reflections,
        }
    }

    /// The ledger this reflector marks.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Unprocessed entry ids, ascending.
    pub fn pending(&self) -> Result<Vec<EntryId>> {
        let ids = self.diary.list()?;
        Ok(unprocessed(&ids, &self.ledger.load()))
    }

    /// Pending count against `threshold`.
    pub fn status(&self, threshold: u32) -> Result<ReflectStatus> {
        let pending = self.pending()?.len();
        Ok(ReflectStatus {
            pending,
            threshold,
            should_reflect: pending >= usize::try_from(threshold).unwrap_or(usize::MAX),
        })
    }

    /// Run one pass now.
    pub fn run(&self) -> Result<PassOutcome> {
        self.run_at(Local::now())
    }

    /// Run one pass as of `now`; the reflection is dated `now`'s local date.
    pub fn run_at(&self, now: DateTime<Local>) -> Result<PassOutcome> {
        let pending = self.pending()?;
        if pending.is_empty() {
            info!("no unprocessed entries, skipping reflection");
            return Ok(PassOutcome::NothingToDo);
        }

        let entries = self.read_available(&pending);
        if entries.is_empty() {
            info!("pending entries vanished before analysis, skipping reflection");
            return Ok(PassOutcome::NothingToDo);
        }

        let sources: Vec<EntryId> = entries.iter().map(|e| e.id).collect();
        let patterns = analyze(entries.iter().map(|e| &e.content));
        info!(
            entries = sources.len(),
            strong = patterns.strong.len(),
            moderate = patterns.moderate.len(),
            emerging = patterns.emerging.len(),
            "analyzed unprocessed entries"
        );

        let (reflection, path) = self.reflections.write(
            now.date_naive(),
            now.with_timezone(&Utc),
            sources,
            patterns,
        )?;

        let marking = self.ledger.mark_processed(&reflection.sources);
        if let Err(e) = &marking {
            warn!(
                reflection_id = %reflection.id,
                error = %e,
                "reflection written but entries not marked processed"
            );
        }

        Ok(PassOutcome::Reflected(ReflectionPass {
            reflection,
            path,
            marking,
        }))
    }

    /// Mark `ids` processed. Used to retry a pass whose marking failed.
    pub fn mark_processed(&self, ids: &[EntryId]) -> Result<()> {
        self.ledger.mark_processed(ids).map_err(MemoryError::Ledger)
    }

    /// Read each pending entry. Entries deleted since listing, or that
    /// cannot be read, are left out of the pass and stay unprocessed.
    fn read_available(&self, ids: &[EntryId]) -> Vec<DiaryEntry> {
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            match self.diary.read(id) {
                Ok(entry) => entries.push(entry),
                Err(e) if e.is_not_found() => {
                    warn!(entry_id = %id, "entry vanished before analysis, skipping");
                }
                Err(e) => {
                    warn!(entry_id = %id, error = %e, "entry unreadable, skipping");
                }
            }
        }
        entries
    }
}
