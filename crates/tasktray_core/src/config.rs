//! Application configuration.
//!
//! # Responsibility
//! - Resolve data, store, and log locations.
//! - Load optional overrides from `config.toml`.
//!
//! # Invariants
//! - A missing config file yields defaults, never an error.
//! - `scan_interval_secs` is at least 1.

use crate::logging::default_log_level;
use crate::reminder::{ScannerSettings, DEFAULT_NOTIFICATION_TIMEOUT, DEFAULT_SCAN_INTERVAL};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR_NAME: &str = "tasktray";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_STORE_FILE: &str = "todos.json";
pub const DEFAULT_APP_NAME: &str = "TaskTray";
pub const DATA_DIR_ENV: &str = "TASKTRAY_DATA_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// On-disk config shape; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    store_file: Option<String>,
    log_dir: Option<PathBuf>,
    log_level: Option<String>,
    scan_interval_secs: Option<u64>,
    notification_timeout_secs: Option<u64>,
    app_name: Option<String>,
    autostart: Option<bool>,
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub store_file: String,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub scan_interval: Duration,
    pub notification_timeout: Duration,
    pub app_name: String,
    pub autostart: bool,
    log_dir_follows_data_dir: bool,
}

impl AppConfig {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            log_dir: data_dir.join("logs"),
            data_dir,
            store_file: DEFAULT_STORE_FILE.to_string(),
            log_level: default_log_level().to_string(),
            scan_interval: DEFAULT_SCAN_INTERVAL,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
            app_name: DEFAULT_APP_NAME.to_string(),
            autostart: false,
            log_dir_follows_data_dir: true,
        }
    }

    /// Loads `<config_dir>/tasktray/config.toml` over platform defaults.
    ///
    /// `TASKTRAY_DATA_DIR` overrides the data directory from both.
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut config = match default_config_path() {
            Some(path) => Self::load_from(&path, default_data_dir())?,
            None => Self::with_data_dir(default_data_dir()),
        };
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|dir| !dir.is_empty()) {
            config.rebase_data_dir(PathBuf::from(dir));
        }
        Ok(config)
    }

    /// Loads overrides from `path` on top of defaults rooted at `data_dir`.
    ///
    /// # Errors
    /// - `ConfigError::Io` when the file exists but cannot be read.
    /// - `ConfigError::Parse` for malformed TOML or unknown keys.
    /// - `ConfigError::Invalid` for out-of-range values.
    pub fn load_from(path: &Path, data_dir: PathBuf) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(Self::with_data_dir(data_dir));
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let file: ConfigFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_file(file, data_dir)
    }

    fn from_file(file: ConfigFile, default_data_dir: PathBuf) -> Result<Self, ConfigError> {
        let explicit_log_dir = file.log_dir.is_some();
        let mut config = Self::with_data_dir(file.data_dir.unwrap_or(default_data_dir));

        if let Some(store_file) = file.store_file {
            if store_file.trim().is_empty() {
                return Err(ConfigError::Invalid("store_file must not be empty".to_string()));
            }
            config.store_file = store_file;
        }
        if let Some(log_dir) = file.log_dir {
            config.log_dir = log_dir;
        }
        if let Some(level) = file.log_level {
            config.log_level = level;
        }
        if let Some(secs) = file.scan_interval_secs {
            if secs == 0 {
                return Err(ConfigError::Invalid(
                    "scan_interval_secs must be at least 1".to_string(),
                ));
            }
            config.scan_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.notification_timeout_secs {
            config.notification_timeout = Duration::from_secs(secs);
        }
        if let Some(app_name) = file.app_name.filter(|name| !name.trim().is_empty()) {
            config.app_name = app_name;
        }
        if let Some(autostart) = file.autostart {
            config.autostart = autostart;
        }
        config.log_dir_follows_data_dir = !explicit_log_dir;
        Ok(config)
    }

    /// Moves the data directory; the log dir follows unless set explicitly.
    fn rebase_data_dir(&mut self, data_dir: PathBuf) {
        if self.log_dir_follows_data_dir {
            self.log_dir = data_dir.join("logs");
        }
        self.data_dir = data_dir;
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store_file)
    }

    pub fn scanner_settings(&self) -> ScannerSettings {
        ScannerSettings {
            interval: self.scan_interval,
            notification_timeout: self.notification_timeout,
            app_name: self.app_name.clone(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Platform data directory, or the working directory when none exists.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            AppConfig::load_from(&dir.path().join("config.toml"), PathBuf::from("/data")).unwrap();

        assert_eq!(config, AppConfig::with_data_dir("/data"));
        assert_eq!(config.store_path(), PathBuf::from("/data/todos.json"));
        assert_eq!(config.scan_interval, Duration::from_secs(60));
    }

    #[test]
    fn file_overrides_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "scan_interval_secs = 5\napp_name = \"Chores\"\nautostart = true\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path, PathBuf::from("/data")).unwrap();
        assert_eq!(config.scan_interval, Duration::from_secs(5));
        assert_eq!(config.app_name, "Chores");
        assert!(config.autostart);
        assert_eq!(config.scanner_settings().interval, Duration::from_secs(5));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "scan_interval_secs = 0\n").unwrap();

        let err = AppConfig::load_from(&path, PathBuf::from("/data")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "colour = \"blue\"\n").unwrap();

        let err = AppConfig::load_from(&path, PathBuf::from("/data")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
