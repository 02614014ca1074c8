use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::KioskError;

/// Port paired with the one the kiosk firmware uses
pub const DEFAULT_PORT: &str = if cfg!(windows) { "COM21" } else { "/dev/ttyUSB0" };
pub const DEFAULT_BAUD_RATE: u32 = 9600;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub port_name: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub discard_backlog: bool,
    pub exit_on_shutdown_command: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port_name: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: 1000,
            poll_interval_ms: 10,
            discard_backlog: true,
            exit_on_shutdown_command: false,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), KioskError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unparsable files fall back to the defaults
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => log::warn!(
                    "Ignoring unreadable config {}: {}",
                    self.path.display(),
                    e
                ),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> Result<(), KioskError> {
        let wrap = |source: std::io::Error| KioskError::Config {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(wrap)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data).map_err(wrap)
    }
}
