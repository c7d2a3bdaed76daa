//! Session lifecycle for the task API.
//!
//! A [`Session`] is an explicit value holding the bearer token issued at
//! login. It is created by a successful login, persisted to
//! `<taskdeck home>/session.json` with restricted permissions (0600),
//! loaded once at startup, and destroyed at logout. There is no expiry
//! metadata; a stale token surfaces as an ordinary failed request.
//!
//! Tokens are never logged or displayed in full.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::{tlog_debug, tlog_warn, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub obtained_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String) -> Self {
        Self {
            token,
            obtained_at: Utc::now(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Shortened token for log lines.
    pub fn token_preview(&self) -> String {
        if self.token.chars().count() > 8 {
            let head: String = self.token.chars().take(8).collect();
            format!("{head}…")
        } else {
            "…".to_string()
        }
    }

    /// Load the persisted session, if any. A missing file means logged out;
    /// an unreadable file is treated the same way (with a warning) so a
    /// corrupt session never wedges startup.
    pub fn load() -> Result<Option<Self>> {
        let path = Config::session_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        tlog_debug!("Session::load path={}", path.display());
        if !path.exists() {
            tlog_debug!("Session file not found, not logged in");
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => {
                tlog_debug!("Session loaded: token={}", session.token_preview());
                Ok(Some(session))
            }
            Err(e) => {
                tlog_warn!("Session file unreadable, ignoring: {}", e);
                Ok(None)
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Config::session_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        tlog_debug!(
            "Session::save path={} token={}",
            path.display(),
            self.token_preview()
        );
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");
        write_restricted(&temp_path, &contents)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Remove the persisted session. Removing an absent file is not an error.
    pub fn clear() -> Result<bool> {
        let path = Config::session_path()?;
        Self::clear_at(&path)
    }

    pub fn clear_at(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        tlog_debug!("Session cleared: {}", path.display());
        Ok(true)
    }
}

#[cfg(unix)]
fn write_restricted(path: &Path, contents: &str) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

#[cfg(not(unix))]
fn write_restricted(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    Ok(())
}
