//! Configuration type, defaults, and validation.
//!
//! Keys are `snake_case` to stay compatible with existing `config.json`
//! files. Keys this crate does not know are kept in [`Config::extra`] and
//! written back untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ConfigError, Result};

/// Key: retention window in days.
pub const RETENTION_DAYS: &str = "retention_days";
/// Key: unprocessed-entry count that triggers reflection.
pub const AUTO_REFLECT_THRESHOLD: &str = "auto_reflect_threshold";
/// Key: whether the auto-capture prompt is enabled.
pub const AUTO_CAPTURE: &str = "auto_capture";
/// Key: turns a session must reach before the capture prompt.
pub const MIN_TURNS: &str = "min_turns";

/// Tunable parameters of the diary/reflection engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum age in days before a diary entry may be deleted.
    pub retention_days: u32,
    /// Number of unprocessed entries at which reflection is due.
    pub auto_reflect_threshold: u32,
    /// Whether sessions are prompted to capture a diary entry.
    pub auto_capture: bool,
    /// Turns a session must reach before it is prompted.
    pub min_turns: u32,
    /// Keys not understood by this version, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retention_days: 30,
            auto_reflect_threshold: 5,
            auto_capture: true,
            min_turns: 3,
            extra: Map::new(),
        }
    }
}

/// Earlier config files stored the capture flag as `plugins.mem.enabled`.
/// Lift it to `auto_capture` when the new key is absent.
pub(crate) fn lift_legacy_keys(user: &mut Map<String, Value>) {
    if user.contains_key(AUTO_CAPTURE) {
        return;
    }
    let legacy = user
        .get("plugins")
        .and_then(|p| p.get("mem"))
        .and_then(|m| m.get("enabled"))
        .cloned();
    if let Some(enabled) = legacy {
        let _ = user.insert(AUTO_CAPTURE.to_string(), enabled);
    }
}

/// Validate the merged JSON object before it is deserialized.
///
/// Every check names the offending key. Nothing is clamped.
pub(crate) fn validate(merged: &Map<String, Value>) -> Result<()> {
    for field in [RETENTION_DAYS, AUTO_REFLECT_THRESHOLD, MIN_TURNS] {
        let _ = require_positive_u32(merged, field)?;
    }
    match merged.get(AUTO_CAPTURE) {
        Some(Value::Bool(_)) => Ok(()),
        Some(other) => Err(ConfigError::InvalidValue {
            field: AUTO_CAPTURE,
            reason: format!("must be a boolean, got {other}"),
        }),
        None => Err(ConfigError::InvalidValue {
            field: AUTO_CAPTURE,
            reason: "missing".to_string(),
        }),
    }
}

fn require_positive_u32(map: &Map<String, Value>, field: &'static str) -> Result<u32> {
    let invalid = |reason: String| ConfigError::InvalidValue { field, reason };
    let value = map.get(field).ok_or_else(|| invalid("missing".to_string()))?;
    match (value.as_u64(), value.as_i64()) {
        (Some(0), _) => Err(invalid("must be >= 1, got 0".to_string())),
        (Some(n), _) => {
            u32::try_from(n).map_err(|_| invalid(format!("must be <= {}, got {n}", u32::MAX)))
        }
        (None, Some(n)) => Err(invalid(format!("must be >= 1, got {n}"))),
        (None, None) => Err(invalid(format!("must be an integer, got {value}"))),
    }
}
