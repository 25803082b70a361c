//! Configuration management for CV-Match clients
//!
//! A thin TOML file with sensible compiled-in defaults; missing files are
//! not an error. `CVMATCH_API_URL` overrides the configured base URL.

use crate::error::{ApiError, Result};
use cvmatch_common::routes;
use etcetera::{choose_base_strategy, BaseStrategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Client configuration structure
///
/// Route destinations are deliberately not configurable: they are compiled
/// into [`cvmatch_common::routes`] so every component agrees on them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    /// API configuration
    pub api: ApiConfig,
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for the CV-Match API
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    crate::client::DEFAULT_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: routes::DEFAULT_API_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the default location
    pub async fn load_default() -> Result<Self> {
        let config_path = Self::config_dir()?.join("config.toml");
        Self::load_from_path(&config_path).await
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file yields the defaults; `CVMATCH_API_URL` overrides the
    /// configured base URL either way.
    pub async fn load_from_path(path: &Path) -> Result<Self> {
        debug!("loading configuration from: {}", path.display());

        let mut config = if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ApiError::Storage {
                    message: format!("failed to read config {}: {e}", path.display()),
                })?;
            toml::from_str(&content).map_err(|e| ApiError::Internal {
                message: format!("failed to parse config: {e}"),
            })?
        } else {
            debug!("configuration file not found, using defaults");
            Self::default()
        };

        if let Ok(base_url) = std::env::var("CVMATCH_API_URL") {
            debug!("overriding API base URL from environment variable");
            config.api.base_url = base_url;
        }

        Ok(config)
    }

    /// Save configuration to a specific path
    pub async fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ApiError::Storage {
                    message: format!("failed to create config directory: {e}"),
                })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ApiError::Internal {
            message: format!("failed to serialize config: {e}"),
        })?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| ApiError::Storage {
                message: format!("failed to write config {}: {e}", path.display()),
            })?;

        info!("configuration saved to {}", path.display());
        Ok(())
    }

    /// Get the configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        let strategy = choose_base_strategy().map_err(|e| ApiError::Storage {
            message: format!("failed to determine base directories: {e}"),
        })?;
        Ok(strategy.config_dir().join("cvmatch"))
    }

    /// Get the data directory (session storage lives here)
    pub fn data_dir() -> Result<PathBuf> {
        let strategy = choose_base_strategy().map_err(|e| ApiError::Storage {
            message: format!("failed to determine base directories: {e}"),
        })?;
        Ok(strategy.data_dir().join("cvmatch"))
    }
}
