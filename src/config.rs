//! Configuration for roomchat
//!
//! Read from `<config dir>/roomchat/config.toml`; every field has a
//! default so the file is optional. Environment variables and command
//! line flags (`--base-url`/`ROOMCHAT_BASE_URL`, `--session`/`ROOMCHAT_SESSION`)
//! are applied on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::session::FileSessionStore;
use crate::truncate::DEFAULT_MESSAGE_LIMIT;

pub const DEFAULT_BASE_URL: &str = "https://whispering-oasis-17943.herokuapp.com/";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Session file; the platform data directory when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Byte budget for published message text.
    pub message_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            message_bytes: DEFAULT_MESSAGE_LIMIT,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields defaults; a malformed one
    /// is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("roomchat").join("config.toml"))
    }

    /// Replace fields with whichever overrides are present.
    pub fn apply_overrides(&mut self, base_url: Option<String>, session_path: Option<PathBuf>) {
        if let Some(url) = base_url.filter(|u| !u.is_empty()) {
            self.server.base_url = url;
        }
        if let Some(path) = session_path {
            self.session.path = Some(path);
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.session
            .path
            .clone()
            .unwrap_or_else(FileSessionStore::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.limits.message_bytes, 254);
        assert!(config.session.path.is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\nmessage_bytes = 16\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.limits.message_bytes, 16);
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nbase_url = 1").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn overrides_win() {
        let mut config = Config::default();
        config.apply_overrides(
            Some("http://localhost:3001".into()),
            Some(PathBuf::from("/tmp/s.json")),
        );
        assert_eq!(config.server.base_url, "http://localhost:3001");
        assert_eq!(config.session_path(), PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn empty_base_url_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(Some(String::new()), None);
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
    }
}
