//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use meetnotes_providers::google::{GoogleConfig, OAuthCredentials};
use thiserror::Error;
use url::Url;

/// Listen address used when none is configured.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3001";

/// Browser client the OAuth callback redirects to.
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:3000";

/// Signing secret used when none is configured. Development only.
pub(crate) const DEVELOPMENT_JWT_SECRET: &str = "meetnotes-development-secret";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("owner email is required")]
    MissingOwner,

    #[error("invalid {field} URL {value:?}: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("google client id and secret must be given together")]
    PartialGoogleCredentials,

    #[error("JWT secret must not be empty")]
    EmptySecret,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds.
    pub listen: SocketAddr,

    /// Directory of the file store.
    pub data_dir: PathBuf,

    /// Keep everything in memory; nothing survives a restart.
    pub ephemeral: bool,

    /// HS256 secret for session tokens. `None` uses the development secret.
    pub jwt_secret: Option<String>,

    /// The distinguished owner identity.
    pub owner_email: String,

    /// Google OAuth client. `None` disables login and calendar routes.
    pub google: Option<GoogleConfig>,

    /// Origin of the browser client.
    pub client_url: String,

    /// Public origin of this server, used for calendar web-hooks.
    pub server_url: String,

    /// Extra origins allowed by CORS. The client URL is always allowed.
    pub cors_origins: Vec<String>,

    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let listen: SocketAddr = ([127, 0, 0, 1], 3001).into();
        Self {
            listen,
            data_dir: default_data_dir(),
            ephemeral: false,
            jwt_secret: None,
            owner_email: String::new(),
            google: None,
            client_url: DEFAULT_CLIENT_URL.to_string(),
            server_url: format!("http://{}", listen),
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Creates a configuration for the given owner.
    pub fn new(owner_email: impl Into<String>) -> Self {
        Self {
            owner_email: owner_email.into(),
            ..Default::default()
        }
    }

    /// Builder: set the listen address.
    ///
    /// Also moves the default server URL when it still points at the old
    /// address.
    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        if self.server_url == format!("http://{}", self.listen) {
            self.server_url = format!("http://{}", listen);
        }
        self.listen = listen;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn with_google(mut self, google: GoogleConfig) -> Self {
        self.google = Some(google);
        self
    }

    pub fn with_client_url(mut self, url: impl Into<String>) -> Self {
        self.client_url = url.into();
        self
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origins.push(origin.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets up the Google client from CLI-style parts.
    ///
    /// Both credentials absent leaves Google unconfigured; only one of them
    /// is an error. The redirect URI defaults to this server's callback route.
    pub fn with_google_credentials(
        mut self,
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
    ) -> ConfigResult<Self> {
        match (client_id, client_secret) {
            (None, None) => Ok(self),
            (Some(id), Some(secret)) => {
                let redirect_uri = redirect_uri.unwrap_or_else(|| self.callback_url());
                self.google = Some(GoogleConfig::new(
                    OAuthCredentials::new(id, secret),
                    redirect_uri,
                ));
                Ok(self)
            }
            _ => Err(ConfigError::PartialGoogleCredentials),
        }
    }

    /// The signing secret, falling back to the development one.
    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret
            .as_deref()
            .unwrap_or(DEVELOPMENT_JWT_SECRET)
    }

    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret.is_none()
    }

    /// Address Google posts calendar change notifications to.
    pub fn notification_url(&self) -> String {
        format!("{}/api/calendar/notification", trim_origin(&self.server_url))
    }

    /// Default OAuth redirect URI.
    pub fn callback_url(&self) -> String {
        format!("{}/api/auth/google/callback", trim_origin(&self.server_url))
    }

    /// Where the browser lands after a successful login.
    pub fn client_callback_url(&self) -> String {
        format!("{}/auth/google/callback", trim_origin(&self.client_url))
    }

    /// Origins accepted by CORS.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![trim_origin(&self.client_url).to_string()];
        for origin in &self.cors_origins {
            let origin = trim_origin(origin).to_string();
            if !origins.contains(&origin) {
                origins.push(origin);
            }
        }
        origins
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.owner_email.trim().is_empty() {
            return Err(ConfigError::MissingOwner);
        }
        if matches!(self.jwt_secret.as_deref(), Some(s) if s.is_empty()) {
            return Err(ConfigError::EmptySecret);
        }
        check_url("client", &self.client_url)?;
        check_url("server", &self.server_url)?;
        for origin in &self.cors_origins {
            check_url("CORS origin", origin)?;
        }
        Ok(())
    }
}

fn check_url(field: &'static str, value: &str) -> ConfigResult<()> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|source| ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
            source,
        })
}

fn trim_origin(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Returns the default file store directory.
///
/// Uses `$XDG_DATA_HOME/meetnotes` (or the platform equivalent), falling back
/// to `./meetnotes-data`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("meetnotes"))
        .unwrap_or_else(|| PathBuf::from("meetnotes-data"))
}
