use crate::schema::{ConfigError, ValidationResult, validate};
use crate::types::Config;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_JSON: &str = include_str!("../../../assets/hostlookup.default.json");

/// Error type for config loading operations.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("failed to access config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// Returns the default config file path (~/.hostlookup.json).
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".hostlookup.json"))
}

/// Ensures the config file at `path` exists, writing the default one if missing.
/// Returns `true` when a new file was created.
///
/// # Errors
///
/// Returns an error if writing the default config file fails.
pub fn ensure_config_exists_at(path: &Path) -> Result<bool, LoadError> {
    if path.exists() {
        return Ok(false);
    }

    fs::write(path, DEFAULT_JSON).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "created default config");

    Ok(true)
}

/// Loads config from a string.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or fails schema validation.
pub fn load_from_str(s: &str) -> Result<Config, ConfigError> {
    s.parse()
}

/// Loads config from a specific path. The file must exist.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the config is invalid.
pub fn load_from_path(path: &Path) -> Result<Config, LoadError> {
    debug!(path = %path.display(), "loading config");

    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    load_from_str(&contents).map_err(|source| LoadError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads config from the default path (~/.hostlookup.json).
///
/// A missing file yields the default config.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or the config is invalid.
pub fn load() -> Result<Config, LoadError> {
    let path = config_path().ok_or(LoadError::NoHomeDir)?;

    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    load_from_path(&path)
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s).map_err(ConfigError::InvalidJson)?;

        if let ValidationResult::Invalid(errors) = validate(&value) {
            return Err(ConfigError::ValidationFailed(errors));
        }

        let config: Config = serde_json::from_value(value).map_err(ConfigError::InvalidJson)?;

        if let Some(raw) = &config.nameserver
            && config.nameserver_addr().is_none()
        {
            return Err(ConfigError::InvalidNameserver(raw.clone()));
        }

        Ok(config)
    }
}
