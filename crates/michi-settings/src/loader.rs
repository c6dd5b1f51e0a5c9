//! Config loading with deep merge and validation.
//!
//! Loading flow:
//! 1. Missing file: write [`Config::default()`] and return it
//! 2. Existing file: parse JSON, deep-merge over serialized defaults
//! 3. Validate the merged object, then deserialize
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use michi_core::FsError;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Config, lift_legacy_keys, validate};
use crate::errors::{ConfigError, Result};

/// Load configuration from `path`, creating it with defaults when absent.
///
/// An existing file is never modified, valid or not.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let config = Config::default();
            save_config(path, &config)?;
            info!(path = %path.display(), "created default config");
            return Ok(config);
        }
        Err(e) => return Err(FsError::new("read", path, e).into()),
    };

    debug!(path = %path.display(), "loading config from file");
    let user: Value = serde_json::from_str(&content).map_err(|source| ConfigError::Unparseable {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Object(mut user) = user else {
        return Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        });
    };
    lift_legacy_keys(&mut user);

    let defaults = serde_json::to_value(Config::default())?;
    let merged = deep_merge(defaults, Value::Object(user));
    let Value::Object(merged) = merged else {
        return Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        });
    };
    validate(&merged)?;

    let config: Config = serde_json::from_value(Value::Object(merged))?;
    Ok(config)
}

/// Persist `config` to `path` atomically (pretty JSON, trailing newline).
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let mut json = serde_json::to_string_pretty(config)?;
    json.push('\n');
    michi_core::fs::replace_atomic(path, &json)?;
    Ok(())
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Lazily loaded configuration bound to one file.
///
/// The first successful [`get`](Self::get) caches the result for the
/// lifetime of the store. Failed loads are not cached.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    cached: OnceLock<Config>,
}

impl ConfigStore {
    /// Store for the config file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: OnceLock::new(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load (first call) or return the cached configuration.
    pub fn get(&self) -> Result<&Config> {
        if let Some(config) = self.cached.get() {
            return Ok(config);
        }
        let config = load_config(&self.path)?;
        Ok(self.cached.get_or_init(|| config))
    }
}
