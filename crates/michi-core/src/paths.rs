//! Storage layout.
//!
//! ```text
//! <root>/config.json
//! <root>/diary/<entry-id>.md
//! <root>/reflections/<reflection-id>.md
//! <root>/reflections/processed.log
//! <root>/state/<session-id>.json
//! ```
//!
//! `<root>` is `$MICHI_MEM_HOME` when set, otherwise `~/.michi-mem`.

use std::path::{Path, PathBuf};

/// Environment variable overriding the storage root.
pub const HOME_ENV: &str = "MICHI_MEM_HOME";

/// Name of the per-user directory under `$HOME`.
pub const ROOT_DIR_NAME: &str = ".michi-mem";

/// Resolve the storage root from the environment.
pub fn default_root() -> PathBuf {
    if let Some(root) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(root);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(ROOT_DIR_NAME)
}

/// Paths of every file and directory the engine owns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemPaths {
    root: PathBuf,
}

impl MemPaths {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at [`default_root`].
    pub fn from_env() -> Self {
        Self::new(default_root())
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Directory holding diary entries.
    pub fn diary_dir(&self) -> PathBuf {
        self.root.join("diary")
    }

    /// Directory holding reflections and the ledger.
    pub fn reflections_dir(&self) -> PathBuf {
        self.root.join("reflections")
    }

    /// The processed-entry ledger.
    pub fn ledger_path(&self) -> PathBuf {
        self.reflections_dir().join("processed.log")
    }

    /// Directory holding per-session tracking records.
    pub fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_under_root() {
        let paths = MemPaths::new("/data/mem");
        assert_eq!(paths.config_path(), PathBuf::from("/data/mem/config.json"));
        assert_eq!(paths.diary_dir(), PathBuf::from("/data/mem/diary"));
        assert_eq!(
            paths.ledger_path(),
            PathBuf::from("/data/mem/reflections/processed.log")
        );
        assert_eq!(paths.state_dir(), PathBuf::from("/data/mem/state"));
    }

    #[test]
    fn ledger_lives_beside_reflections() {
        let paths = MemPaths::new("/r");
        assert_eq!(paths.ledger_path().parent(), Some(paths.reflections_dir().as_path()));
    }
}
