//! Session token storage.
//!
//! The token is kept as a single line in a 0600 file and replaced whenever
//! the server hands out a refreshed one.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use meetnotes_core::Role;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// File-backed session token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored token, if any.
    pub fn load(&self) -> ClientResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the stored token or an authentication error.
    pub fn require(&self) -> ClientResult<String> {
        self.load()?.ok_or_else(|| {
            ClientError::AuthRequired("no session token, run `meetnotes login` first".to_string())
        })
    }

    /// Replaces the stored token.
    pub fn save(&self, token: &str) -> ClientResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::Input("token must not be empty".to_string()));
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, format!("{}\n", token))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
        }
        fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), "saved session token");
        Ok(())
    }

    /// Removes the stored token. Returns false if there was none.
    pub fn clear(&self) -> ClientResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// What the client can read from a token without the signing key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenSummary {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

impl TokenSummary {
    /// Decodes the payload segment. The signature is not checked.
    pub fn decode(token: &str) -> ClientResult<Self> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| ClientError::Input("token is not a JWT".to_string()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ClientError::Input(format!("token payload is not base64: {}", e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Input(format!("token payload is not valid: {}", e)))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now
    }
}
