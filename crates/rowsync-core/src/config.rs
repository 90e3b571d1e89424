#![forbid(unsafe_code)]

//! Engine configuration as data.
//!
//! [`SyncConfig`] collects the tunables of an [`Engine`](crate::engine::Engine).
//! With the `config` feature it can be loaded from TOML or JSON:
//!
//! ```toml
//! # rowsync.toml
//! reporting = "log"
//! verify_postconditions = true
//! ```
//!
//! ```rust,ignore
//! let config = SyncConfig::from_toml_file("rowsync.toml")?;
//! let engine: Engine<String> = Engine::with_config(&config);
//! ```
//!
//! Missing fields take their [`Default`] values.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::policy::{ReportingLevel, ReportingPolicy};

// ---------------------------------------------------------------------------
// SyncConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SyncConfig {
    /// Warn-path behaviour when no warn handler is installed.
    pub reporting: ReportingLevel,

    /// Re-check `store == requested` after every reconcile.
    /// Defaults to on in debug builds.
    pub verify_postconditions: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reporting: ReportingLevel::default(),
            verify_postconditions: cfg!(debug_assertions),
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub fn with_reporting(mut self, level: ReportingLevel) -> Self {
        self.reporting = level;
        self
    }

    #[must_use]
    pub fn with_verify_postconditions(mut self, verify: bool) -> Self {
        self.verify_postconditions = verify;
        self
    }

    /// A handler-less policy at the configured level.
    #[must_use]
    pub fn policy(&self) -> ReportingPolicy {
        ReportingPolicy::new(self.reporting)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::TomlSer)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[source] toml::de::Error),

    #[cfg(feature = "config")]
    #[error("TOML serialize error: {0}")]
    TomlSer(#[source] toml::ser::Error),

    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[source] serde_json::Error),
}
