//! Configuration file (`mount-notify.toml`)
//!
//! ```toml
//! [database]
//! path = "~/.local/share/mount-notify/filecache.db"
//! reconnect_delay_secs = 60
//!
//! [listener]
//! ignore = ["**/.git/**"]
//!
//! [[mounts]]
//! id = 42
//! mount_point = "/shared"
//! backend = "local"
//! root = "/srv/shared"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::error::NotifyError;
use crate::mounts::MountConfig;
use crate::watcher::IgnoreFilter;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub database: DatabaseConfig,
    pub self_test: SelfTestConfig,
    pub logging: LoggingConfig,
    pub listener: ListenerConfig,
    pub mounts: Vec<MountConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file holding the metadata cache
    pub path: String,

    /// How long to wait on a locked database before failing
    pub busy_timeout_ms: u64,

    /// Pause between reconnect attempts after losing the connection
    pub reconnect_delay_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "filecache.db".to_string(),
            busy_timeout_ms: 5000,
            reconnect_delay_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfTestConfig {
    /// Pause between self-test steps so the watcher can catch up
    pub settle_ms: u64,
}

impl Default for SelfTestConfig {
    fn default() -> Self {
        Self { settle_ms: 100 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily rolling log files; console only when unset
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Globs for storage paths whose changes are not reconciled
    pub ignore: Vec<String>,
}

impl NotifyConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: NotifyConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for mount in &self.mounts {
            if !seen.insert(mount.id) {
                return Err(ConfigError::Invalid(format!("duplicate mount id {}", mount.id)));
            }
        }

        self.ignore_filter()?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.database.path).into_owned())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.database.busy_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.database.reconnect_delay_secs)
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.self_test.settle_ms)
    }

    pub fn log_directory(&self) -> Option<PathBuf> {
        self.logging
            .directory
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()))
    }

    pub fn ignore_filter(&self) -> Result<IgnoreFilter, ConfigError> {
        IgnoreFilter::new(&self.listener.ignore)
            .map_err(|e| ConfigError::Invalid(format!("listener.ignore: {}", e)))
    }

    pub fn find_mount(&self, mount_id: i64) -> Result<&MountConfig, NotifyError> {
        self.mounts
            .iter()
            .find(|mount| mount.id == mount_id)
            .ok_or_else(|| NotifyError::Configuration(format!("Mount with id \"{}\" not found", mount_id)))
    }
}
