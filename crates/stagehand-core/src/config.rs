//! Engine configuration.

use std::fs;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of undoable operations retained.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Upper bound accepted for `history_limit`.
pub const MAX_HISTORY_LIMIT: usize = 10_000;

/// Configuration for a file operation session.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EngineConfig {
    /// Maximum depth of the undo stack (0 disables history).
    #[builder(default = "DEFAULT_HISTORY_LIMIT")]
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Send deleted items to the OS trash instead of removing them.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub use_trash: bool,

    /// Carry modification/access times over to copied files.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub preserve_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn check_history_limit(limit: usize) -> Result<(), String> {
    if limit > MAX_HISTORY_LIMIT {
        return Err(format!(
            "history_limit {limit} exceeds the maximum of {MAX_HISTORY_LIMIT}"
        ));
    }
    Ok(())
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(limit) = self.history_limit {
            check_history_limit(limit)?;
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Create a new config builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Location of the per-user config file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stagehand").join("config.toml"))
    }

    /// Parse a config from TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Load the per-user config file, or defaults when there is none.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_history_limit(self.history_limit)
            .map_err(|message| ConfigError::Invalid { message })
    }

    /// Override the history limit.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Override trash usage.
    pub fn with_trash(mut self, use_trash: bool) -> Self {
        self.use_trash = use_trash;
        self
    }

    /// Whether history retains anything at all.
    pub fn history_enabled(&self) -> bool {
        self.history_limit > 0
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            use_trash: true,
            preserve_timestamps: true,
        }
    }
}
