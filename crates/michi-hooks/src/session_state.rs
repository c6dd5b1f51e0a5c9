//! Per-session state records.
//!
//! One JSON file per session under the state directory, replaced atomically
//! on every change. Session ids come from the host tool and are not trusted
//! as file names: every byte outside `[A-Za-z0-9_-]` is percent-encoded
//! (`a.b` is stored as `a%2Eb`), so distinct ids never share a record. The
//! empty id is stored as `%`.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use michi_core::FsError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::Result;

/// What is remembered about one session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    /// Completed turns.
    pub turns: u32,
    /// Whether the capture prompt has been issued.
    pub prompted: bool,
    /// Last change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn file_stem(session_id: &str) -> String {
    if session_id.is_empty() {
        return "%".to_string();
    }
    let mut stem = String::with_capacity(session_id.len());
    for byte in session_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            let _ = write!(stem, "%{byte:02X}");
        }
    }
    stem
}

/// Session records stored in one directory.
#[derive(Clone, Debug)]
pub struct SessionStateStore {
    dir: PathBuf,
}

impl SessionStateStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// State directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `session_id`'s record.
    pub fn path_of(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(session_id)))
    }

    /// Current record; a fresh one if none exists.
    ///
    /// A record that no longer parses is replaced by a fresh one on the next
    /// write.
    pub fn load(&self, session_id: &str) -> Result<SessionState> {
        let path = self.path_of(session_id);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SessionState::default()),
            Err(e) => return Err(FsError::new("read", &path, e).into()),
        };
        match serde_json::from_str(&text) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt session state, starting fresh");
                Ok(SessionState::default())
            }
        }
    }

    fn save(&self, session_id: &str, state: &SessionState) -> Result<()> {
        let path = self.path_of(session_id);
        let json = serde_json::to_string(state)?;
        michi_core::fs::replace_atomic(&path, &json)?;
        Ok(())
    }

    fn update(
        &self,
        session_id: &str,
        change: impl FnOnce(&mut SessionState),
    ) -> Result<SessionState> {
        let mut state = self.load(session_id)?;
        change(&mut state);
        state.updated_at = Some(Utc::now());
        self.save(session_id, &state)?;
        Ok(state)
    }

    /// Count one more turn and persist it.
    pub fn record_turn(&self, session_id: &str) -> Result<SessionState> {
        let state = self.update(session_id, |s| s.turns = s.turns.saturating_add(1))?;
        debug!(session_id, turns = state.turns, "recorded turn");
        Ok(state)
    }

    /// Latch the capture prompt as issued and persist it.
    pub fn mark_prompted(&self, session_id: &str) -> Result<SessionState> {
        self.update(session_id, |s| s.prompted = true)
    }

    /// Remove the record. Returns whether one existed.
    pub fn clear(&self, session_id: &str) -> Result<bool> {
        let path = self.path_of(session_id);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(session_id, "cleared session state");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FsError::new("delete", &path, e).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HookError;
    use assert_matches::assert_matches;

    fn store() -> (tempfile::TempDir, SessionStateStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStateStore::new(tmp.path().join("state"));
        (tmp, store)
    }

    #[test]
    fn unknown_session_is_fresh() {
        let (_tmp, store) = store();
        assert_eq!(store.load("s1").unwrap(), SessionState::default());
    }

    #[test]
    fn turns_accumulate_across_loads() {
        let (_tmp, store) = store();
        let _ = store.record_turn("s1").unwrap();
        let _ = store.record_turn("s1").unwrap();
        let state = store.record_turn("s1").unwrap();

        assert_eq!(state.turns, 3);
        assert_eq!(store.load("s1").unwrap().turns, 3);
        assert!(store.load("s1").unwrap().updated_at.is_some());
        assert_eq!(store.load("s2").unwrap().turns, 0);
    }

    #[test]
    fn prompted_latch_persists() {
        let (_tmp, store) = store();
        let _ = store.record_turn("s1").unwrap();
        let _ = store.mark_prompted("s1").unwrap();

        let state = store.load("s1").unwrap();
        assert!(state.prompted);
        assert_eq!(state.turns, 1);
    }

    #[test]
    fn session_ids_are_encoded() {
        let (_tmp, store) = store();
        let path = store.path_of("../../etc/passwd");
        assert_eq!(path.parent(), Some(store.dir()));
        assert_eq!(path.file_name().unwrap(), "%2E%2E%2F%2E%2E%2Fetc%2Fpasswd.json");
        assert_eq!(store.path_of("").file_name().unwrap(), "%.json");
        assert_eq!(store.path_of("abc-DEF_9").file_name().unwrap(), "abc-DEF_9.json");
        assert_eq!(store.path_of("é").file_name().unwrap(), "%C3%A9.json");
    }

    #[test]
    fn similar_ids_get_distinct_records() {
        let (_tmp, store) = store();
        let ids = ["a.b", "a_b", "a/b", "a%2Eb", "a%b", ""];
        let mut paths: Vec<PathBuf> = ids.iter().map(|id| store.path_of(id)).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), ids.len());

        let _ = store.record_turn("a.b").unwrap();
        let _ = store.record_turn("a.b").unwrap();
        let _ = store.record_turn("a_b").unwrap();
        assert_eq!(store.load("a.b").unwrap().turns, 2);
        assert_eq!(store.load("a_b").unwrap().turns, 1);
    }

    #[test]
    fn clear_removes_record() {
        let (_tmp, store) = store();
        let _ = store.record_turn("s1").unwrap();

        assert!(store.clear("s1").unwrap());
        assert!(!store.clear("s1").unwrap());
        assert_eq!(store.load("s1").unwrap(), SessionState::default());
    }

    #[test]
    fn corrupt_record_starts_fresh() {
        let (_tmp, store) = store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.path_of("s1"), "{not json").unwrap();

        assert_eq!(store.load("s1").unwrap(), SessionState::default());
        assert_eq!(store.record_turn("s1").unwrap().turns, 1);
    }

    #[test]
    fn unwritable_state_dir_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("state");
        std::fs::write(&blocker, "file").unwrap();

        let err = SessionStateStore::new(&blocker).record_turn("s1").unwrap_err();

        assert_matches!(err, HookError::Io(_));
    }
}
