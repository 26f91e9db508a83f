//! Configuration file loading with precedence handling.
//!
//! Precedence is defaults → config file → CLI overrides. A missing file is
//! not an error; a present-but-broken file is.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permissions, I/O).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/sweb/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Control scheme preset name ("vim", "nano" or "emacs").
    #[serde(default)]
    pub controls: Option<String>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Request timeout in seconds for the fetch collaborator.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with every request.
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Control scheme preset name.
    pub controls: String,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            controls: "vim".to_string(),
            log_file_path: default_log_path(),
            timeout_secs: 30,
            user_agent: concat!("sweb/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/sweb/sweb.log` on Unix-like systems, or the
/// platform equivalent elsewhere. Falls back to the current directory when
/// no state directory can be determined.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("sweb").join("sweb.log")
    } else {
        PathBuf::from("sweb.log")
    }
}

/// Resolve default config file path (`~/.config/sweb/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sweb").join("config.toml"))
}

/// Load a configuration file from a specific path.
///
/// Returns `Ok(None)` if the file doesn't exist (not an error - use
/// defaults). Returns `Err` if the file exists but cannot be read or parsed.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Load the config file from an explicit path or the default location.
///
/// An explicit path that is missing still resolves to defaults;
/// configuration is optional everywhere.
pub fn load_config_with_precedence(
    explicit: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    match explicit.or_else(default_config_path) {
        Some(path) => load_config_file(path),
        None => Ok(None),
    }
}

/// Merge an optional config file over the hardcoded defaults.
pub fn merge_config(file: Option<ConfigFile>) -> ResolvedConfig {
    let mut resolved = ResolvedConfig::default();
    if let Some(file) = file {
        if let Some(controls) = file.controls {
            resolved.controls = controls;
        }
        if let Some(path) = file.log_file_path {
            resolved.log_file_path = path;
        }
        if let Some(secs) = file.timeout_secs {
            resolved.timeout_secs = secs;
        }
        if let Some(agent) = file.user_agent {
            resolved.user_agent = agent;
        }
    }
    resolved
}

/// Apply CLI argument overrides (highest precedence).
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    controls_override: Option<String>,
) -> ResolvedConfig {
    if let Some(controls) = controls_override {
        config.controls = controls;
    }
    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
