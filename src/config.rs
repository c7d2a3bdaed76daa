use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::{tlog_debug, Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub server_url: Option<String>,
}

impl Config {
    /// Application home directory. `TASKDECK_HOME` overrides the default
    /// `~/.taskdeck` (used by tests to sandbox persisted state).
    pub fn taskdeck_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("TASKDECK_HOME") {
            return Ok(PathBuf::from(dir));
        }
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".taskdeck"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::taskdeck_dir()?.join("taskdeck.toml"))
    }

    pub fn session_path() -> Result<PathBuf> {
        Ok(Self::taskdeck_dir()?.join("session.json"))
    }

    /// Base URL of the task API, falling back to the built-in default.
    pub fn effective_server_url(&self) -> String {
        self.server_url
            .clone()
            .unwrap_or_else(|| crate::api::DEFAULT_BASE_URL.to_string())
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        tlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            tlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(&path)?)?;
        tlog_debug!("Config loaded: server_url={:?}", config.server_url);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let dir = Self::taskdeck_dir()?;
        tlog_debug!("Config::save dir={}", dir.display());
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        let path = Self::config_path()?;
        fs::write(&path, toml::to_string_pretty(self)?)?;
        tlog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}
