//! # michi-settings
//!
//! Configuration store for michi-mem.
//!
//! Settings live in `<root>/config.json` (see [`michi_core::MemPaths`]):
//! 1. **Compiled defaults**: [`Config::default()`]
//! 2. **User file**: deep-merged over defaults; unknown keys are kept
//!
//! A missing file is created with the defaults. An existing file is
//! validated on every load and never rewritten; invalid values fail the
//! load with [`ConfigError::InvalidValue`] instead of being clamped.
//!
//! # Usage
//!
//! ```no_run
//! use michi_settings::ConfigStore;
//!
//! let store = ConfigStore::new("/home/me/.michi-mem/config.json");
//! let config = store.get()?;
//! println!("retention: {} days", config.retention_days);
//! # Ok::<(), michi_settings::ConfigError>(())
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod loader;

pub use config::Config;
pub use errors::{ConfigError, Result};
pub use loader::{ConfigStore, deep_merge, load_config, save_config};
