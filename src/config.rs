//! Persisted settings, read once at startup and written once at exit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ViewState;
use crate::theme::DEFAULT_THEME;

const CONFIG_DIR: &str = "markln";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    #[serde(alias = "themefolder")]
    pub theme_folder: PathBuf,
    pub last_file: Option<PathBuf>,
    pub window_mode: ViewState,
    pub render_delay_ms: u64,
    pub auto_preview: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            theme_folder: PathBuf::from("./themes/"),
            last_file: None,
            window_mode: ViewState::Split,
            render_delay_ms: 1000,
            auto_preview: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot access config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No config directory on this platform")]
    NoConfigDir,
}

impl Config {
    /// `<config_dir>/markln/config.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn render_delay(&self) -> Duration {
        Duration::from_millis(self.render_delay_ms)
    }

    /// Theme folder with a leading `~` expanded. Relative folders resolve
    /// against the working directory.
    pub fn theme_folder(&self) -> PathBuf {
        expand_home(&self.theme_folder)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Missing or unreadable configs fall back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(err) => {
                tracing::warn!(error = %err, "using default config");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }
}

/// Replaces a leading `~` with the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
