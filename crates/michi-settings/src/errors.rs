//! Configuration error types.

use std::path::PathBuf;

use michi_core::FsError;
use thiserror::Error;

/// Errors that can occur when loading, validating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error(transparent)]
    Io(#[from] FsError),
    /// The config file is not valid JSON.
    #[error("config file {} is not valid JSON: {source}", .path.display())]
    Unparseable {
        /// Offending file.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// The config file parsed but is not a JSON object.
    #[error("config file {} must contain a JSON object", .path.display())]
    NotAnObject {
        /// Offending file.
        path: PathBuf,
    },
    /// A known key holds an out-of-range or wrongly typed value.
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidValue {
        /// Offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// Encoding the configuration to JSON failed.
    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ConfigError {
    /// Name of the offending field, for validation failures.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_display_names_field() {
        let err = ConfigError::InvalidValue {
            field: "retention_days",
            reason: "must be >= 1, got 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for `retention_days`: must be >= 1, got 0"
        );
        assert_eq!(err.field(), Some("retention_days"));
    }

    #[test]
    fn unparseable_display() {
        let source = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err = ConfigError::Unparseable {
            path: PathBuf::from("/x/config.json"),
            source,
        };
        assert!(err.to_string().contains("/x/config.json"));
        assert!(err.to_string().contains("not valid JSON"));
        assert_eq!(err.field(), None);
    }

    #[test]
    fn io_error_from_conversion() {
        let fs = FsError::new(
            "read",
            "/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let err: ConfigError = fs.into();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
