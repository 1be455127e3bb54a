//! core::config
//!
//! Configuration loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Worktree config file (`R/.ply/config.toml`)
//! 4. CLI flags (not handled here)
//!
//! Missing files are not an error. Files that exist but fail to parse or
//! validate are.
//!
//! # Example
//!
//! ```no_run
//! use ply::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/tree"))).unwrap();
//! println!("three-way: {}", config.three_way());
//! ```

pub mod schema;

pub use schema::PlyConfig;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::paths::PlyPaths;

/// Default commit message for exported patches.
pub const DEFAULT_EXPORT_MESSAGE: &str = "Add or update patch {ordinal}";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: PlyConfig,
    /// Worktree configuration (if a root was given and the file exists)
    pub worktree: Option<PlyConfig>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `root` is provided, also loads `root/.ply/config.toml`.
    pub fn load(root: Option<&Path>) -> Result<Self, ConfigError> {
        let global_path = Self::global_candidates().into_iter().find(|p| p.is_file());
        let global = match &global_path {
            Some(path) => {
                debug!(path = %path.display(), "loading global config");
                Self::read_config(path)?
            }
            None => PlyConfig::default(),
        };

        let worktree_path = root
            .map(|r| PlyPaths::new(r).config_path())
            .filter(|p| p.is_file());
        let worktree = match &worktree_path {
            Some(path) => {
                debug!(path = %path.display(), "loading worktree config");
                Some(Self::read_config(path)?)
            }
            None => None,
        };

        global.validate()?;
        if let Some(ref w) = worktree {
            w.validate()?;
        }

        Ok(Config { global, worktree })
    }

    /// Global config locations, in search order.
    fn global_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("PLY_CONFIG") {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("ply/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".ply/config.toml"));
        }
        candidates
    }

    fn read_config(path: &Path) -> Result<PlyConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write worktree config atomically (temp file, fsync, rename).
    pub fn write_worktree(root: &Path, config: &PlyConfig) -> Result<PathBuf, ConfigError> {
        config.validate()?;
        let path = PlyPaths::new(root).config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.clone(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let write_err = |source| ConfigError::WriteError {
            path: temp_path.clone(),
            source,
        };
        let mut file = fs::File::create(&temp_path).map_err(write_err)?;
        file.write_all(contents.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        fs::rename(&temp_path, &path).map_err(|e| ConfigError::WriteError {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Whether patches are applied with three-way merge tolerance.
    ///
    /// Defaults to `true`.
    pub fn three_way(&self) -> bool {
        self.worktree
            .as_ref()
            .and_then(|w| w.three_way)
            .or(self.global.three_way)
            .unwrap_or(true)
    }

    /// Commit message template for exports.
    pub fn export_message_template(&self) -> &str {
        self.worktree
            .as_ref()
            .and_then(|w| w.export_message.as_deref())
            .or(self.global.export_message.as_deref())
            .unwrap_or(DEFAULT_EXPORT_MESSAGE)
    }

}
