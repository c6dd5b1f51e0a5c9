//! Auto-capture trigger.
//!
//! Decides when a session has run long enough that the host should ask for
//! a diary entry. The decision is a one-shot latch per session: once `true`
//! has been returned, every later call for that session returns `false`.
//! The latch is persisted before `true` is returned, so a crash right after
//! cannot produce a second prompt.

use michi_settings::Config;
use tracing::info;

use crate::errors::Result;
use crate::session_state::SessionStateStore;

/// Turn-count capture trigger.
#[derive(Clone, Debug)]
pub struct CaptureTrigger {
    store: SessionStateStore,
    enabled: bool,
    min_turns: u32,
}

impl CaptureTrigger {
    /// Trigger over `store`, using `config`'s `auto_capture` and `min_turns`.
    pub fn new(store: SessionStateStore, config: &Config) -> Self {
        Self {
            store,
            enabled: config.auto_capture,
            min_turns: config.min_turns,
        }
    }

    /// Underlying session store.
    pub fn store(&self) -> &SessionStateStore {
        &self.store
    }

    /// Count a completed turn. Returns the session's turn total.
    pub fn record_turn(&self, session_id: &str) -> Result<u32> {
        Ok(self.store.record_turn(session_id)?.turns)
    }

    /// Whether to prompt for capture now.
    ///
    /// `false` when auto-capture is disabled, when this session was already
    /// prompted, or when it has fewer than `min_turns` turns.
    pub fn should_prompt(&self, session_id: &str) -> Result<bool> {
        if !self.enabled {
            return Ok(false);
        }
        let state = self.store.load(session_id)?;
        if state.prompted || state.turns < self.min_turns {
            return Ok(false);
        }
        let _ = self.store.mark_prompted(session_id)?;
        info!(session_id, turns = state.turns, "capture threshold reached");
        Ok(true)
    }

    /// [`record_turn`](Self::record_turn) then
    /// [`should_prompt`](Self::should_prompt).
    pub fn on_turn(&self, session_id: &str) -> Result<bool> {
        let _ = self.record_turn(session_id)?;
        self.should_prompt(session_id)
    }
}
