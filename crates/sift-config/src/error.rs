//! Error types for sift configuration.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::de;

/// Errors that can occur when loading or processing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A ranking parameter is outside its legal range.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Dotted key of the offending setting, e.g. `ranking.summary_boost`.
        key: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A locale is bound to more than one analyzer within a single file.
    #[error("locale {locale} is bound to both {first} and {second}")]
    ConflictingBinding {
        /// The locale with two bindings.
        locale: String,
        /// First analyzer seen.
        first: String,
        /// Second analyzer seen.
        second: String,
    },
}

impl ConfigError {
    /// Creates an `InvalidValue` error for a dotted key.
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}
