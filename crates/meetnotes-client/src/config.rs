//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/meetnotes/config.toml` by default:
//!
//! ```toml
//! server_url = "https://notes.example.com"
//! token_path = "/home/me/.local/share/meetnotes/token"
//! timeout = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Server the client talks to when nothing is configured.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3001";

/// Configuration for the meetnotes client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the meetnotes server.
    pub server_url: String,

    /// Where the session token is kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,

    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token_path: None,
            timeout: 10,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it does not
    /// exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Builder: override the server URL.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Builder: override the timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = secs;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Token file, falling back to the default location.
    pub fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("token"))
    }

    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.server_url).map_err(|e| {
            ClientError::Config(format!("invalid server_url {:?}: {}", self.server_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "server_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.timeout == 0 {
            return Err(ClientError::Config("timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meetnotes")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meetnotes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.token_path().ends_with("meetnotes/token"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server_url = \"https://notes.example.com\"\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.server_url, "https://notes.example.com");
        assert_eq!(config.timeout, 10);
        assert!(config.token_path.is_none());
    }

    #[test]
    fn full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "server_url = \"http://localhost:9000\"\ntoken_path = \"/tmp/tok\"\ntimeout = 3\n",
        )
        .unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.token_path(), PathBuf::from("/tmp/tok"));
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn bad_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout = \"soon\"").unwrap();
        assert!(matches!(
            ClientConfig::load_from(&path),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::load_from(&dir.path().join("missing.toml")),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn validation() {
        assert!(ClientConfig::default().with_server_url("nope").validate().is_err());
        assert!(
            ClientConfig::default()
                .with_server_url("ftp://x")
                .validate()
                .is_err()
        );
        assert!(ClientConfig::default().with_timeout(0).validate().is_err());
    }

    #[test]
    fn serializes_to_toml() {
        let text = toml::to_string_pretty(&ClientConfig::default()).unwrap();
        assert!(text.contains("server_url = \"http://127.0.0.1:3001\""));
        assert!(!text.contains("token_path"));
    }
}
