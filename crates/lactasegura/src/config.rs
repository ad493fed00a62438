//! Configuration management for the lactasegura core.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "lactasegura";

/// Default IMC history file name.
const IMC_HISTORY_FILE_NAME: &str = "lactasegura_imc_history.json";

/// Default named-records file name.
const RECORDS_FILE_NAME: &str = "lactasegura_records.json";

/// Default articles cache file name.
const ARTICLES_CACHE_FILE_NAME: &str = "lactasegura_articles_cache.json";

/// Default remote config file name.
const REMOTE_CONFIG_FILE_NAME: &str = "remote_config.json";

/// Default backup file name.
const BACKUP_FILE_NAME: &str = "backup.json";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LACTASEGURA_`)
/// 2. TOML config file at `~/.config/lactasegura/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Network configuration.
    pub network: NetworkConfig,
}

/// Storage-related configuration.
///
/// All data files live in a single flat directory, one JSON file per store.
/// The default directory is the working directory, matching how the app has
/// always laid out its files next to the executable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON data files.
    /// Defaults to the working directory.
    pub data_dir: Option<PathBuf>,
}

/// Network-related configuration for the connectivity probe and the remote
/// article fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Host used for the TCP connectivity probe.
    pub probe_host: String,
    /// Port used for the TCP connectivity probe.
    pub probe_port: u16,
    /// Connectivity probe timeout in seconds.
    pub probe_timeout_secs: u64,
    /// Remote article fetch request timeout in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            // Public DNS reachability check, same endpoint the app has
            // probed since the first release.
            probe_host: "8.8.8.8".to_string(),
            probe_port: 53,
            probe_timeout_secs: 2,
            fetch_timeout_secs: 6,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `LACTASEGURA_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("LACTASEGURA_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.network.probe_timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "probe_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.network.fetch_timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "fetch_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.network.probe_host.is_empty() {
            return Err(Error::ConfigValidation {
                message: "probe_host must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving the default if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Path to the IMC history store file.
    #[must_use]
    pub fn imc_history_path(&self) -> PathBuf {
        self.data_dir().join(IMC_HISTORY_FILE_NAME)
    }

    /// Path to the named-records store file.
    #[must_use]
    pub fn records_path(&self) -> PathBuf {
        self.data_dir().join(RECORDS_FILE_NAME)
    }

    /// Path to the articles cache file.
    #[must_use]
    pub fn articles_cache_path(&self) -> PathBuf {
        self.data_dir().join(ARTICLES_CACHE_FILE_NAME)
    }

    /// Path to the remote config file.
    #[must_use]
    pub fn remote_config_path(&self) -> PathBuf {
        self.data_dir().join(REMOTE_CONFIG_FILE_NAME)
    }

    /// Path to the sync backup file.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        self.data_dir().join(BACKUP_FILE_NAME)
    }

    /// Get the connectivity probe timeout as a Duration.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.network.probe_timeout_secs)
    }

    /// Get the fetch request timeout as a Duration.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.network.fetch_timeout_secs)
    }
}
