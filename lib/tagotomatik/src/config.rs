//! Centralized configuration management.
//!
//! Every environment variable is read once, at startup, through
//! [`AppConfig::from_env`]. The resulting value is passed to whatever needs it.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{LibraryError, Result};
use crate::notify::{DEFAULT_TOAST_MS, ERROR_TOAST_MS};

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:9766";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the tagging backend (default: "http://127.0.0.1:9766")
    pub backend_url: String,
    /// Optional API key sent as `X-API-Key`
    pub api_key: Option<String>,
    /// Directory holding the persisted JSON state
    pub state_dir: PathBuf,
    /// Upper bound for a single backend request (default: 300s)
    pub request_timeout: Duration,
    pub toast_ms: u64,
    pub error_toast_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            backend_url: env::var("TAGOTOMATIK_BACKEND_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            api_key: env::var("TAGOTOMATIK_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            state_dir: env::var_os("TAGOTOMATIK_STATE_DIR")
                .map(PathBuf::from)
                .or_else(default_state_dir)
                .ok_or_else(|| {
                    LibraryError::Config(
                        "TAGOTOMATIK_STATE_DIR is unset and no home directory was found".into(),
                    )
                })?,
            request_timeout: Duration::from_secs(env_u64(
                "TAGOTOMATIK_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            toast_ms: env_u64("TAGOTOMATIK_TOAST_MS", DEFAULT_TOAST_MS)?,
            error_toast_ms: env_u64("TAGOTOMATIK_ERROR_TOAST_MS", ERROR_TOAST_MS)?,
        })
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn state_dir(&self) -> &PathBuf {
        &self.state_dir
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| LibraryError::Config(format!("{key} must be a number, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

/// `$XDG_DATA_HOME/tagotomatik`, or `~/.local/share/tagotomatik` when
/// `XDG_DATA_HOME` is not set.
pub fn default_state_dir() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
    };

    data_home.map(|d| d.join("tagotomatik"))
}
