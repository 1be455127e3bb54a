//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$PLY_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/ply/config.toml`
//! 3. `~/.ply/config.toml`
//!
//! # Worktree Config
//!
//! Located at `R/.ply/config.toml`.
//!
//! Both files share one schema; worktree values win.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Placeholder substituted with the ordinal in export commit messages.
pub const ORDINAL_PLACEHOLDER: &str = "{ordinal}";

/// Settings file contents.
///
/// # Example
///
/// ```toml
/// three_way = true
/// export_message = "Refresh patch {ordinal}"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PlyConfig {
    /// Apply patches with three-way merge tolerance.
    pub three_way: Option<bool>,

    /// Commit message the exporter records in the patch repository.
    pub export_message: Option<String>,
}

impl PlyConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(message) = &self.export_message {
            if !message.contains(ORDINAL_PLACEHOLDER) {
                return Err(ConfigError::InvalidValue(format!(
                    "export_message must contain '{}': {:?}",
                    ORDINAL_PLACEHOLDER, message
                )));
            }
        }
        Ok(())
    }
}
