//! Retention sweeper.
//!
//! Deletes diary entries whose last-modified age is strictly greater than
//! the retention window; an entry exactly `retention_days` old survives.
//! Stale side-files (orphaned `*.tmp` writes in the diary directory, and
//! session records in the state directory) are deleted after one day
//! regardless of the window.
//!
//! The sweep does not consult the ledger. Entries that were never reflected
//! upon are deleted once they age out. Reflections and the ledger live
//! outside the swept directories and are never touched.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use michi_core::fs::TEMP_SUFFIX;
use michi_core::{EntryId, FsError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{DiaryError, Result};

/// Age after which side-files are considered stale.
pub const SIDE_FILE_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Outcome of one sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Diary entries deleted.
    pub entries_deleted: usize,
    /// Temp and session side-files deleted.
    pub side_files_deleted: usize,
}

#[derive(Clone, Copy)]
enum Kind {
    Entry,
    SideFile,
    Other,
}

/// Deletes aged diary entries and stale side-files.
#[derive(Clone, Debug)]
pub struct RetentionSweeper {
    diary_dir: PathBuf,
    state_dir: Option<PathBuf>,
}

impl RetentionSweeper {
    /// Sweeper over the diary directory.
    pub fn new(diary_dir: impl Into<PathBuf>) -> Self {
        Self {
            diary_dir: diary_dir.into(),
            state_dir: None,
        }
    }

    /// Also expire session records in `state_dir`.
    #[must_use]
    pub fn with_state_dir(mut self, state_dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(state_dir.into());
        self
    }

    /// Sweep relative to the current time.
    pub fn sweep(&self, retention_days: u32) -> Result<SweepReport> {
        self.sweep_at(retention_days, SystemTime::now())
    }

    /// Sweep relative to `now`.
    ///
    /// A file that cannot be examined or deleted is logged and skipped; the
    /// rest of the sweep still runs. If anything failed the result is
    /// [`DiaryError::SweepIncomplete`] carrying the deletions that happened.
    pub fn sweep_at(&self, retention_days: u32, now: SystemTime) -> Result<SweepReport> {
        let retention = Duration::from_secs(u64::from(retention_days) * SECS_PER_DAY);
        let mut sweep = Sweep::new(now);

        let classify_diary = |name: &str| {
            if EntryId::from_file_name(name).is_some() {
                (Kind::Entry, retention)
            } else if name.ends_with(TEMP_SUFFIX) {
                (Kind::SideFile, SIDE_FILE_MAX_AGE)
            } else {
                (Kind::Other, Duration::MAX)
            }
        };
        sweep.dir(&self.diary_dir, classify_diary);

        if let Some(state_dir) = &self.state_dir {
            let classify_state = |name: &str| {
                if name.ends_with(".json") || name.ends_with(TEMP_SUFFIX) {
                    (Kind::SideFile, SIDE_FILE_MAX_AGE)
                } else {
                    (Kind::Other, Duration::MAX)
                }
            };
            sweep.dir(state_dir, classify_state);
        }

        let Sweep {
            report,
            failed,
            first_failure,
            ..
        } = sweep;
        info!(
            entries_deleted = report.entries_deleted,
            side_files_deleted = report.side_files_deleted,
            failed,
            retention_days,
            "retention sweep complete"
        );
        match first_failure {
            None => Ok(report),
            Some(first) => Err(DiaryError::SweepIncomplete {
                report,
                failed,
                first,
            }),
        }
    }
}

/// Age of a file, or `None` if it vanished. Future mtimes count as age zero.
fn age_of(path: &Path, now: SystemTime) -> std::result::Result<Option<Duration>, FsError> {
    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(FsError::new("stat", path, e)),
    };
    Ok(Some(now.duration_since(modified).unwrap_or(Duration::ZERO)))
}

/// Running state of one sweep.
struct Sweep {
    now: SystemTime,
    report: SweepReport,
    failed: usize,
    first_failure: Option<FsError>,
}

impl Sweep {
    fn new(now: SystemTime) -> Self {
        Self {
            now,
            report: SweepReport::default(),
            failed: 0,
            first_failure: None,
        }
    }

    fn fail(&mut self, err: FsError) {
        warn!(error = %err, "sweep step failed, continuing");
        self.failed += 1;
        if self.first_failure.is_none() {
            self.first_failure = Some(err);
        }
    }

    fn dir(&mut self, dir: &Path, classify: impl Fn(&str) -> (Kind, Duration)) {
        let read_dir = match std::fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "nothing to sweep, directory missing");
                return;
            }
            Err(e) => return self.fail(FsError::new("list", dir, e)),
        };

        for dirent in read_dir {
            let dirent = match dirent {
                Ok(dirent) => dirent,
                Err(e) => {
                    self.fail(FsError::new("list", dir, e));
                    continue;
                }
            };
            let Some(name) = dirent.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let (kind, max_age) = classify(&name);
            if matches!(kind, Kind::Other) {
                continue;
            }
            if !dirent.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            self.file(&dirent.path(), kind, max_age);
        }
    }

    fn file(&mut self, path: &Path, kind: Kind, max_age: Duration) {
        let age = match age_of(path, self.now) {
            Ok(Some(age)) => age,
            Ok(None) => return,
            Err(e) => return self.fail(e),
        };
        if age <= max_age {
            return;
        }
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return,
            Err(e) => return self.fail(FsError::new("delete", path, e)),
        }
        debug!(path = %path.display(), age_secs = age.as_secs(), "deleted expired file");
        match kind {
            Kind::Entry => self.report.entries_deleted += 1,
            Kind::SideFile => self.report.side_files_deleted += 1,
            Kind::Other => {}
        }
    }
}
