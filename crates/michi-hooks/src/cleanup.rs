//! Session-end cleanup.

use michi_core::MemPaths;
use michi_diary::{RetentionSweeper, SweepReport};
use michi_settings::Config;
use tracing::warn;

use crate::session_state::SessionStateStore;

/// Drop `session_id`'s state record and sweep expired entries.
///
/// Never fails: errors are logged and the deletions that did happen are
/// reported.
pub fn on_session_end(paths: &MemPaths, config: &Config, session_id: &str) -> SweepReport {
    if let Err(e) = SessionStateStore::new(paths.state_dir()).clear(session_id) {
        warn!(session_id, error = %e, "failed to clear session state");
    }

    RetentionSweeper::new(paths.diary_dir())
        .with_state_dir(paths.state_dir())
        .sweep(config.retention_days)
        .unwrap_or_else(|e| {
            warn!(error = %e, "retention sweep incomplete at session end");
            e.partial_report().unwrap_or_default()
        })
}
