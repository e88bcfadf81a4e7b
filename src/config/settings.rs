//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::ThrottlePolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portprobe)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/portprobe)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Locate the XDG directories. Nothing is created on disk.
    pub fn discover() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "portprobe", "portprobe")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the key/value store file.
    pub fn store_file(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Explicit connect timeout; unset leaves it to the network stack.
    pub connect_timeout_ms: Option<u64>,
    /// Address the HTTP config endpoint binds to.
    pub listen_addr: String,
    /// Default log filter when RUST_LOG is unset.
    pub log_level: String,
    /// Override for the key/value store file.
    pub store_path: Option<PathBuf>,
    pub throttle_min_delay_ms: u64,
    pub throttle_max_delay_ms: u64,
    pub throttle_error_threshold: usize,
    pub throttle_error_penalty_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: None,
            listen_addr: "127.0.0.1:8080".to_string(),
            log_level: "info".to_string(),
            store_path: None,
            throttle_min_delay_ms: 50,
            throttle_max_delay_ms: 150,
            throttle_error_threshold: 5,
            throttle_error_penalty_ms: 10,
        }
    }
}

impl AppSettings {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// A missing default settings file yields defaults; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let file = Paths::discover()?.settings_file();
                if !file.exists() {
                    return Ok(Self::default());
                }
                Self::load_from(&file)
            }
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self = serde_json::from_str(&content)?;
        settings.throttle_policy()?;
        Ok(settings)
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Build the throttle policy these settings describe.
    pub fn throttle_policy(&self) -> ConfigResult<ThrottlePolicy> {
        ThrottlePolicy::new(
            Duration::from_millis(self.throttle_min_delay_ms),
            Duration::from_millis(self.throttle_max_delay_ms),
            self.throttle_error_threshold,
            Duration::from_millis(self.throttle_error_penalty_ms),
        )
    }

    /// Resolve where the key/value store lives.
    pub fn store_file(&self) -> ConfigResult<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Paths::discover()?.store_file()),
        }
    }
}
