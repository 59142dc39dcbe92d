//! Name-resolution settings.
//!
//! Loaded from JSON with path context in error messages; every field has a
//! default so an empty object (or no file at all) is a valid configuration.
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static DEFAULT_SETTINGS: Lazy<Settings> = Lazy::new(Settings::default);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Characters discarded from raw keys before building accessor names.
    pub strip_chars: Vec<char>,
    /// Suffix that turns an accessor name into a presence check.
    pub query_suffix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strip_chars: vec!['@'],
            query_suffix: "?".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("at JSON path {path} → {message}")]
    Parse { path: String, message: String },

    #[error("invalid config value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

impl Settings {
    /// Shared defaults for instances created outside of a schema.
    pub fn shared_default() -> &'static Settings {
        &DEFAULT_SETTINGS
    }

    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        let de = &mut serde_json::Deserializer::from_str(src);
        let settings: Settings = serde_path_to_error::deserialize(de).map_err(|err| {
            ConfigError::Parse {
                path: err.path().to_string(),
                message: err.into_inner().to_string(),
            }
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&src)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query_suffix.is_empty() {
            return Err(ConfigError::Invalid {
                field: "query_suffix",
                message: "must not be empty".to_string(),
            });
        }
        if let Some(c) = self.strip_chars.iter().find(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid {
                field: "strip_chars",
                message: format!("letters cannot be stripped from keys (got '{c}')"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let settings = Settings::from_json_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.strip_chars, vec!['@']);
        assert_eq!(settings.query_suffix, "?");
    }

    #[test]
    fn parse_errors_carry_json_path() {
        let err = Settings::from_json_str(r#"{"strip_chars": ["@", 3]}"#).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, "strip_chars[1]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Settings::from_json_str(r#"{"query_sufix": "?"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_query_suffix_is_invalid() {
        let err = Settings::from_json_str(r#"{"query_suffix": ""}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "query_suffix", .. }));
    }
}
