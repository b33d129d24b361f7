#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for modman
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/modman/config.toml)
//! - Environment variables
//! - CLI flags (applied by the front end)

pub mod constants;
pub mod paths;

pub use paths::InstallPaths;

use modman_errors::{ConfigError, Error};
use modman_types::AppType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub app_type: AppType,
    #[serde(default = "default_parallel_downloads")]
    pub parallel_downloads: usize,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub install_root: Option<PathBuf>,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_download_base_url")]
    pub download_base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Remote catalog query defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_status_filter")]
    pub status_filter: String,
    #[serde(default = "default_sort_field")]
    pub sort_field: String,
    #[serde(default = "default_sort_direction")]
    pub sort_direction: i32,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            app_type: AppType::default(),
            parallel_downloads: default_parallel_downloads(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            download_base_url: default_download_base_url(),
            timeout: default_timeout(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            status_filter: default_status_filter(),
            sort_field: default_sort_field(),
            sort_direction: default_sort_direction(),
        }
    }
}

// Default value functions for serde
fn default_parallel_downloads() -> usize {
    4
}

fn default_api_url() -> String {
    "https://beatmods.com/api/v1/".to_string()
}

fn default_download_base_url() -> String {
    "https://beatmods.com".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1 // 1 second
}

fn default_user_agent() -> String {
    format!("modman/{}", env!("CARGO_PKG_VERSION"))
}

fn default_status_filter() -> String {
    "approved".to_string()
}

fn default_sort_field() -> String {
    "name_lower".to_string()
}

fn default_sort_direction() -> i32 {
    1
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("modman").join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Save configuration to a file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<(), Error> {
        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            error: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError {
                    path: parent.display().to_string(),
                    error: e.to_string(),
                })?;
        }

        fs::write(path, contents)
            .await
            .map_err(|e| ConfigError::WriteError {
                path: path.display().to_string(),
                error: e.to_string(),
            })?;
        Ok(())
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(root) = std::env::var(constants::ENV_INSTALL_ROOT) {
            if !root.is_empty() {
                self.paths.install_root = Some(PathBuf::from(root));
            }
        }

        if let Ok(app_type) = std::env::var(constants::ENV_APP_TYPE) {
            self.general.app_type = parse_app_type(&app_type).ok_or_else(|| {
                ConfigError::InvalidValue {
                    field: constants::ENV_APP_TYPE.to_string(),
                    value: app_type.clone(),
                }
            })?;
        }

        Ok(())
    }

    /// Resolve the installation layout
    ///
    /// # Errors
    ///
    /// Returns an error if no installation root has been configured.
    pub fn install_paths(&self) -> Result<InstallPaths, Error> {
        let root = self
            .paths
            .install_root
            .clone()
            .ok_or_else(|| ConfigError::MissingField {
                field: "paths.install_root".to_string(),
            })?;
        Ok(InstallPaths::new(root))
    }
}

fn parse_app_type(value: &str) -> Option<AppType> {
    match value.trim().to_ascii_lowercase().as_str() {
        "steam" => Some(AppType::Steam),
        "oculus" => Some(AppType::Oculus),
        _ => None,
    }
}
