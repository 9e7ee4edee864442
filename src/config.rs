//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `--config <FILE>` on the command line
//! 2. `$BOUNCELOG_CONFIG` (environment variable)
//! 3. `~/.config/bouncelog/config.toml` (Linux)
//!    `%APPDATA%\bouncelog\config.toml` (Windows)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BounceError, Result};
use crate::parser::report::PartLabels;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Labels of the bounce sub-parts a report is built from.
    pub parts: PartLabels,
    /// Where and how bounce records are written.
    pub sink: SinkConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for the diagnostic log.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Bounce log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Directory receiving the hourly `YYYYMMDD-HH.log` files.
    pub log_dir: Option<PathBuf>,
    /// Permissions of newly created log files (default: 0o640).
    pub file_mode: u32,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            file_mode: 0o640,
        }
    }
}

impl SinkConfig {
    /// The configured log directory, or `<data dir>/bouncelog`.
    pub fn log_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.log_dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bouncelog")
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Result of a configuration lookup.
///
/// Loading never fails: a file that cannot be used is kept in `error` and the
/// defaults are used instead. Call [`LoadedConfig::log_outcome`] once logging
/// is set up, since the lookup runs before any subscriber exists.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    /// The effective configuration.
    pub config: Config,
    /// The file that was read, or attempted.
    pub path: Option<PathBuf>,
    /// Why `path` could not be used.
    pub error: Option<BounceError>,
}

impl LoadedConfig {
    /// Emit the lookup result as a tracing event.
    pub fn log_outcome(&self) {
        match (&self.path, &self.error) {
            (Some(path), Some(e)) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to load config, using defaults"
            ),
            (Some(path), None) => tracing::info!(path = %path.display(), "Loaded config"),
            (None, _) => tracing::debug!("No config file, using defaults"),
        }
    }
}

/// Load configuration from `explicit`, else from the standard locations.
///
/// An explicit file is always attempted; a standard-location file only when it
/// exists. Any failure falls back to [`Config::default`].
pub fn load_config(explicit: Option<&Path>) -> LoadedConfig {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_file_path() {
            Some(path) if path.exists() => path,
            _ => return LoadedConfig::default(),
        },
    };

    match load_config_from(&path) {
        Ok(config) => LoadedConfig {
            config,
            path: Some(path),
            error: None,
        },
        Err(e) => LoadedConfig {
            config: Config::default(),
            path: Some(path),
            error: Some(e),
        },
    }
}

/// Load configuration from one file. Errors are returned, not defaulted.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| BounceError::io(path, e))?;
    toml::from_str::<Config>(&contents).map_err(|e| BounceError::InvalidConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("BOUNCELOG_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("bouncelog").join("config.toml"))
}

/// Return the cache directory for the diagnostic log.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bouncelog")
}
