//! User settings file support.
//!
//! Settings are read from a TOML file with the following behavior:
//! - Forward-compatible: unknown fields are ignored
//! - Graceful degradation: errors in the default file are logged but don't stop the command
//! - Layered: defaults < settings file < command-line arguments

use etcetera::BaseStrategy;
use std::path::{Path, PathBuf};

use crate::events::TraceEvent;

/// Root settings structure.
///
/// All fields are optional to support forward compatibility and partial configuration.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings for `comptree generate`.
    pub generate: GenerateConfig,

    /// Settings for `comptree install` and `comptree uninstall`.
    pub install: InstallConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Settings for script generation.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Wrap generated scripts in a function with this name unless `--wrap` is given.
    pub wrap: Option<String>,
}

/// Settings for script installation.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Directories searched, in order, for the bash completions directory.
    #[serde(rename = "target-directories")]
    pub target_directories: Option<Vec<PathBuf>>,

    /// Prefix install and uninstall commands with `sudo` when not running as root.
    #[serde(rename = "use-sudo")]
    pub use_sudo: Option<bool>,
}

/// Logging settings.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Events to trace at debug level, in addition to any given with `--debug`.
    #[serde(rename = "debug-events")]
    pub debug_events: Vec<TraceEvent>,
}

/// Result of attempting to load a settings file.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded settings, or default if loading failed.
    pub config: Config,

    /// The path that was used (or attempted) for loading.
    pub path: Option<PathBuf>,

    /// Any error that occurred during loading.
    pub error: Option<ConfigLoadError>,

    /// Whether the path was explicitly provided by the user (via `--config-file`).
    /// If true and there's an error, the command should fail rather than continue.
    pub explicit_path: bool,
}

/// Errors that can occur when loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// Failed to read the settings file.
    #[error("failed to read config file: {0}")]
    Io(#[source] std::io::Error),

    /// Failed to parse the TOML content.
    #[error("failed to parse config file: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Returns the default settings file path for the current platform.
///
/// Returns `None` if the platform's config directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("comptree").join("config.toml"))
}

/// Loads settings from the specified path.
///
/// Note: This function sets `explicit_path` to `false`. Use [`load_config`] for
/// proper handling of explicit vs. default paths.
pub fn load_from_path(path: &Path) -> ConfigLoadResult {
    let (config, error) = match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(ConfigLoadError::Parse(e))),
        },
        Err(e) => (Config::default(), Some(ConfigLoadError::Io(e))),
    };

    ConfigLoadResult {
        config,
        path: Some(path.to_path_buf()),
        error,
        explicit_path: false,
    }
}

/// Loads settings based on the provided options.
///
/// # Arguments
///
/// * `disabled` - If true, skip loading and return defaults
/// * `explicit_path` - If provided, use this path instead of the default
pub fn load_config(disabled: bool, explicit_path: Option<&Path>) -> ConfigLoadResult {
    let defaults = |path| ConfigLoadResult {
        config: Config::default(),
        path,
        error: None,
        explicit_path: false,
    };

    if disabled {
        return defaults(None);
    }

    let is_explicit = explicit_path.is_some();

    let path = match explicit_path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            // Can't determine config path; use defaults silently
            None => return defaults(None),
        },
    };

    // If using default path and file doesn't exist, silently use defaults
    if !is_explicit && !path.exists() {
        return defaults(Some(path));
    }

    let mut result = load_from_path(&path);
    result.explicit_path = is_explicit;
    result
}
