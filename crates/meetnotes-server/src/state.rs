//! Shared handler state.

use std::sync::Arc;

use meetnotes_core::{AccessGate, OwnerIdentity};
use meetnotes_providers::{CalendarApi, IdentityProvider};

use crate::config::ServerConfig;
use crate::notes::NoteRepository;
use crate::roles::RoleStore;
use crate::session::SessionKeys;
use crate::store::DocumentStore;

/// URLs handlers need to build redirects and web-hook addresses.
#[derive(Debug, Clone)]
pub struct Links {
    /// Browser landing page after login.
    pub client_callback: String,
    /// Calendar change notification endpoint.
    pub notification: String,
}

/// Everything a request handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub notes: NoteRepository,
    pub roles: RoleStore,
    pub gate: Arc<AccessGate>,
    pub sessions: Arc<SessionKeys>,
    pub identity: Arc<dyn IdentityProvider>,
    pub calendar: Arc<dyn CalendarApi>,
    pub links: Arc<Links>,
}

impl AppState {
    pub fn new(
        config: &ServerConfig,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        calendar: Arc<dyn CalendarApi>,
    ) -> Self {
        let owner = OwnerIdentity::new(config.owner_email.as_str());
        Self {
            notes: NoteRepository::new(store.clone()),
            roles: RoleStore::new(store, owner.clone()),
            gate: Arc::new(AccessGate::new(owner)),
            sessions: Arc::new(SessionKeys::new(config.jwt_secret().as_bytes())),
            identity,
            calendar,
            links: Arc::new(Links {
                client_callback: config.client_callback_url(),
                notification: config.notification_url(),
            }),
        }
    }
}
