//! Application configuration.
//!
//! Read from `<config dir>/flashdeck/config.toml` when it exists; every
//! field is optional and falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{FileStorage, KeyValueStore, StorageError, DEFAULT_QUOTA_BYTES};

/// Accepted range for `session_days`
pub const SESSION_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the key-value files (default: local data dir)
    pub data_dir: Option<PathBuf>,
    /// Session lifetime in days
    pub session_days: i64,
    /// Quiet period before deck changes are written
    pub autosave_debounce_ms: u64,
    /// Artificial delay before auth calls resolve
    pub auth_latency_ms: u64,
    /// Byte budget for all stored values; 0 disables the limit
    pub storage_quota_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            session_days: crate::auth::session::DEFAULT_SESSION_DAYS,
            autosave_debounce_ms: crate::debounce::DEFAULT_QUIET_PERIOD.as_millis() as u64,
            auth_latency_ms: 0,
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl AppConfig {
    /// `<config dir>/flashdeck/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("flashdeck").join("config.toml"))
    }

    /// Load an explicit config file (must exist), or the default one if present
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SESSION_DAYS_RANGE.contains(&self.session_days) {
            return Err(ConfigError::Invalid {
                field: "session_days",
                reason: format!(
                    "{} is outside {}..={}",
                    self.session_days,
                    SESSION_DAYS_RANGE.start(),
                    SESSION_DAYS_RANGE.end()
                ),
            });
        }
        Ok(())
    }

    pub fn resolved_data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(FileStorage::default_data_dir()?),
        }
    }

    /// Session lifetime; the default when `session_days` is out of range
    pub fn session_duration(&self) -> chrono::Duration {
        let fallback = chrono::Duration::days(crate::auth::session::DEFAULT_SESSION_DAYS);
        if !SESSION_DAYS_RANGE.contains(&self.session_days) {
            return fallback;
        }
        chrono::Duration::try_days(self.session_days).unwrap_or(fallback)
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn auth_latency(&self) -> Duration {
        Duration::from_millis(self.auth_latency_ms)
    }

    /// Open the file-backed store described by this config
    pub fn open_storage(&self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        let quota = (self.storage_quota_bytes > 0).then_some(self.storage_quota_bytes);
        let storage = FileStorage::new(self.resolved_data_dir()?).with_quota(quota);
        storage.init()?;
        Ok(Arc::new(storage))
    }
}
