//! Checker configuration (`typeck.toml`)
//!
//! Every field has a default, so an empty file is a valid configuration.

use crate::semantic::Diagnostics;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Checker configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Diagnostic reporting
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl CheckerConfig {
    /// Load a configuration from a file path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Parse a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            source: e,
        })
    }

    /// A diagnostic collector honouring the configured error cap
    #[must_use]
    pub fn sink(&self) -> Diagnostics {
        Diagnostics::with_limit(self.diagnostics.max_errors)
    }
}

/// Diagnostic reporting options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Warn about edge updates that change no state
    #[serde(default = "default_true")]
    pub no_effect_warnings: bool,
    /// Stop storing errors after this many; the count stays exact
    #[serde(default)]
    pub max_errors: Option<usize>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            no_effect_warnings: true,
            max_errors: None,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Errors that can occur when loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        /// Path that caused the error
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
    /// Parse error in TOML
    #[error("Parse error in {}: {source}", path.display())]
    Parse {
        /// Path that caused the error
        path: PathBuf,
        /// Underlying parse error
        source: toml::de::Error,
    },
}
