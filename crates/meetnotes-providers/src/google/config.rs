//! Google OAuth client configuration.

use std::time::Duration;

use crate::error::{ProviderError, ProviderResult};

/// OAuth 2.0 client credentials from the Google Cloud Console.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Checks that both values are present.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(ProviderError::configuration("client_id is required"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(ProviderError::configuration("client_secret is required"));
        }
        Ok(())
    }
}

// The secret stays out of logs.
impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Configuration for the Google identity and calendar clients.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub credentials: OAuthCredentials,

    /// Redirect URI registered for the web client; Google sends the
    /// authorization code here.
    pub redirect_uri: String,

    /// OAuth scopes to request.
    pub scopes: Vec<String>,

    /// Calendar queried by the calendar client.
    pub calendar_id: String,

    /// Request timeout.
    pub timeout: Duration,

    pub user_agent: String,
}

impl GoogleConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Calendar read, event access and basic profile.
    pub const DEFAULT_SCOPES: [&'static str; 4] = [
        "https://www.googleapis.com/auth/calendar.readonly",
        "https://www.googleapis.com/auth/calendar.events",
        "https://www.googleapis.com/auth/userinfo.profile",
        "https://www.googleapis.com/auth/userinfo.email",
    ];

    pub fn new(credentials: OAuthCredentials, redirect_uri: impl Into<String>) -> Self {
        Self {
            credentials,
            redirect_uri: redirect_uri.into(),
            scopes: Self::DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            calendar_id: "primary".to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("meetnotes/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates credentials and the redirect URI.
    pub fn validate(&self) -> ProviderResult<()> {
        self.credentials.validate()?;
        url::Url::parse(&self.redirect_uri).map_err(|e| {
            ProviderError::configuration(format!(
                "invalid redirect URI '{}': {}",
                self.redirect_uri, e
            ))
        })?;
        if self.scopes.is_empty() {
            return Err(ProviderError::configuration("at least one scope is required"));
        }
        Ok(())
    }

    /// Builds the shared HTTP client.
    pub(crate) fn http_client(&self) -> ProviderResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })
    }
}
