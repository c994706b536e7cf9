//! Meeting notes HTTP API.
//!
//! This crate provides the `meetnotesd` server:
//! - Notes with append-only version history, one per calendar event
//! - REGULAR / ADMIN / OWNER roles and the admin views they unlock
//! - Google sign-in issuing signed session tokens with silent refresh
//! - Pass-through access to the signed-in user's Google Calendar
//!
//! # Example
//!
//! ```rust,no_run
//! use meetnotes_server::{ServerConfig, SignalHandler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::new("owner@example.com").with_ephemeral(true);
//!     let signals = SignalHandler::new();
//!     signals.spawn_listener();
//!     meetnotes_server::run(config, signals.handle()).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod notes;
pub mod roles;
pub mod routes;
pub mod session;
pub mod signals;
pub mod state;
pub mod store;

use std::sync::Arc;

use meetnotes_providers::google::{GoogleCalendar, GoogleOAuth};
use meetnotes_providers::{CalendarApi, IdentityProvider, UnconfiguredProvider};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use auth::AuthContext;
pub use config::{ConfigError, ServerConfig, default_data_dir};
pub use error::{ApiError, RepositoryError, RepositoryResult, ServerError, ServerResult};
pub use notes::NoteRepository;
pub use roles::RoleStore;
pub use routes::router;
pub use session::{Claims, SessionError, SessionKeys};
pub use signals::{ShutdownHandle, SignalHandler};
pub use state::AppState;
pub use store::{DocumentStore, FileStore, MemoryStore};

/// Opens the configured store.
///
/// Falls back to an in-memory store when the data directory cannot be
/// prepared; the server still starts but forgets everything on exit.
pub async fn open_store(config: &ServerConfig) -> Arc<dyn DocumentStore> {
    if config.ephemeral {
        info!("using in-memory store");
        return Arc::new(MemoryStore::new());
    }
    match FileStore::open(config.data_dir.clone()).await {
        Ok(store) => {
            info!(path = %store.root().display(), "using file store");
            Arc::new(store)
        }
        Err(e) => {
            warn!(
                path = %config.data_dir.display(),
                error = %e,
                "data directory unavailable, falling back to in-memory store"
            );
            Arc::new(MemoryStore::new())
        }
    }
}

/// Builds the identity and calendar providers.
///
/// Without Google credentials both are stand-ins answering 503.
pub fn build_providers(
    config: &ServerConfig,
) -> ServerResult<(Arc<dyn IdentityProvider>, Arc<dyn CalendarApi>)> {
    match &config.google {
        Some(google) => {
            let identity: Arc<dyn IdentityProvider> = Arc::new(GoogleOAuth::new(google.clone())?);
            let calendar: Arc<dyn CalendarApi> = Arc::new(GoogleCalendar::new(google)?);
            Ok((identity, calendar))
        }
        None => {
            warn!("Google OAuth client not configured; sign-in and calendar routes are disabled");
            let provider = Arc::new(UnconfiguredProvider::new(
                "Google OAuth client is not configured",
            ));
            let identity: Arc<dyn IdentityProvider> = provider.clone();
            let calendar: Arc<dyn CalendarApi> = provider;
            Ok((identity, calendar))
        }
    }
}

/// Runs the server until `shutdown` fires.
pub async fn run(config: ServerConfig, shutdown: ShutdownHandle) -> ServerResult<()> {
    config.validate()?;
    if config.uses_development_secret() {
        warn!("JWT_SECRET not set, signing sessions with the development secret");
    }

    let store = open_store(&config).await;
    let (identity, calendar) = build_providers(&config)?;
    let state = AppState::new(&config, store, identity, calendar);
    if state.roles.ensure_owner_initialized().await? {
        info!(email = %config.owner_email, "owner role initialized at startup");
    }

    let app = router(state, &config);
    let listener = TcpListener::bind(config.listen).await?;
    info!(addr = %config.listen, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.wait())
        .await?;

    info!("server stopped");
    Ok(())
}
