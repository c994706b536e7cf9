//! Command-line interface of `meetnotesd`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use meetnotes_core::TracingOutputFormat;

use crate::config::{ConfigResult, DEFAULT_CLIENT_URL, DEFAULT_LISTEN, ServerConfig};

/// meetnotesd - meeting notes API server
#[derive(Debug, Parser)]
#[command(name = "meetnotesd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "MEETNOTES_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Directory for stored notes and roles
    #[arg(long, env = "MEETNOTES_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Keep all data in memory
    #[arg(long, conflicts_with = "data_dir")]
    pub ephemeral: bool,

    /// Secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Email of the account permanently holding the OWNER role
    #[arg(long, env = "MEETNOTES_OWNER_EMAIL")]
    pub owner_email: String,

    // --- Google ---
    /// Google OAuth client ID
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub google_client_id: Option<String>,

    /// Google OAuth client secret
    #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    pub google_client_secret: Option<String>,

    /// OAuth redirect URI (defaults to this server's callback route)
    #[arg(long, env = "GOOGLE_REDIRECT_URI")]
    pub google_redirect_uri: Option<String>,

    // --- URLs ---
    /// Browser client origin
    #[arg(long, env = "MEETNOTES_CLIENT_URL", default_value = DEFAULT_CLIENT_URL)]
    pub client_url: String,

    /// Public origin of this server, for calendar web-hooks
    #[arg(long, env = "SERVER_URL")]
    pub server_url: Option<String>,

    /// Additional allowed CORS origin (can be repeated)
    #[arg(long = "cors-origin", action = clap::ArgAction::Append)]
    pub cors_origins: Vec<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout: u64,

    // --- Logging ---
    /// Log output format: pretty, compact or json
    #[arg(long, env = "MEETNOTES_LOG_FORMAT", default_value = "json")]
    pub log_format: TracingOutputFormat,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub debug: bool,
}

impl Cli {
    /// Converts the parsed arguments into a server configuration.
    pub fn into_config(self) -> ConfigResult<ServerConfig> {
        let mut config = ServerConfig::new(self.owner_email)
            .with_listen(self.listen)
            .with_ephemeral(self.ephemeral)
            .with_client_url(self.client_url)
            .with_request_timeout(Duration::from_secs(self.request_timeout));

        if let Some(dir) = self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(secret) = self.jwt_secret {
            config = config.with_jwt_secret(secret);
        }
        if let Some(url) = self.server_url {
            config = config.with_server_url(url);
        }
        for origin in self.cors_origins {
            config = config.with_cors_origin(origin);
        }

        let config = config.with_google_credentials(
            self.google_client_id,
            self.google_client_secret,
            self.google_redirect_uri,
        )?;
        config.validate()?;
        Ok(config)
    }
}
