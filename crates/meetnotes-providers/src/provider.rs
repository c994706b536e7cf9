//! Provider traits.
//!
//! [`IdentityProvider`] covers the OAuth authorization-code exchange, access
//! token refresh and profile lookup. [`CalendarApi`] proxies calendar reads
//! and channel registration with a caller-supplied access token. The server
//! holds both as trait objects so tests can substitute in-process fakes.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the traits object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Tokens returned by a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    /// Only present when offline access was granted.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Profile of the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityProfile {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Time range for an event listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl EventWindow {
    /// Default lookahead for upcoming meetings.
    pub const DEFAULT_HOURS: i64 = 24;

    pub fn new(time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        Self { time_min, time_max }
    }

    /// Window starting at `now` and spanning the default lookahead.
    pub fn upcoming(now: DateTime<Utc>) -> Self {
        Self::new(now, now + Duration::hours(Self::DEFAULT_HOURS))
    }

    /// Fills missing bounds from the default window anchored at `now`.
    ///
    /// A lone `time_min` gets the default lookahead after it.
    pub fn from_bounds(
        time_min: Option<DateTime<Utc>>,
        time_max: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let time_min = time_min.unwrap_or(now);
        let time_max =
            time_max.unwrap_or_else(|| time_min + Duration::hours(Self::DEFAULT_HOURS));
        Self::new(time_min, time_max)
    }
}

/// A push-notification channel registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchChannel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Callback URL notified on calendar changes.
    pub address: String,
}

impl WatchChannel {
    /// Creates a web-hook channel whose id is derived from `now`.
    pub fn web_hook(address: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("watch-{}", now.timestamp_millis()),
            kind: "web_hook".to_string(),
            address: address.into(),
        }
    }
}

/// OAuth identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Returns the provider name (e.g. "google").
    fn name(&self) -> &str;

    /// Builds the consent URL requesting offline access.
    fn authorization_url(&self) -> ProviderResult<String>;

    /// Exchanges an authorization code for tokens.
    fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<TokenSet>>;

    /// Obtains a fresh access token from a refresh token.
    fn refresh_access_token<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<String>>;

    /// Fetches the profile of the user owning `access_token`.
    fn user_info<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<IdentityProfile>>;
}

/// Calendar read and watch operations against the user's primary calendar.
///
/// Event payloads are passed through untouched.
pub trait CalendarApi: Send + Sync {
    /// Lists single (expanded) events in `window`, ordered by start time.
    /// Returns the JSON array of events.
    fn list_events<'a>(
        &'a self,
        access_token: &'a str,
        window: EventWindow,
    ) -> BoxFuture<'a, ProviderResult<serde_json::Value>>;

    /// Fetches one event by id.
    fn get_event<'a>(
        &'a self,
        access_token: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<serde_json::Value>>;

    /// Registers a push-notification channel and returns the upstream
    /// channel resource.
    fn watch<'a>(
        &'a self,
        access_token: &'a str,
        channel: WatchChannel,
    ) -> BoxFuture<'a, ProviderResult<serde_json::Value>>;
}

/// A provider that fails every call.
///
/// Stands in for Google when no OAuth client is configured, so the rest of
/// the API stays usable.
#[derive(Debug, Clone)]
pub struct UnconfiguredProvider {
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> ProviderError {
        ProviderError::configuration(self.reason.clone())
    }
}

impl IdentityProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn authorization_url(&self) -> ProviderResult<String> {
        Err(self.error())
    }

    fn exchange_code<'a>(&'a self, _code: &'a str) -> BoxFuture<'a, ProviderResult<TokenSet>> {
        Box::pin(async move { Err(self.error()) })
    }

    fn refresh_access_token<'a>(
        &'a self,
        _refresh_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move { Err(self.error()) })
    }

    fn user_info<'a>(
        &'a self,
        _access_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<IdentityProfile>> {
        Box::pin(async move { Err(self.error()) })
    }
}

impl CalendarApi for UnconfiguredProvider {
    fn list_events<'a>(
        &'a self,
        _access_token: &'a str,
        _window: EventWindow,
    ) -> BoxFuture<'a, ProviderResult<serde_json::Value>> {
        Box::pin(async move { Err(self.error()) })
    }

    fn get_event<'a>(
        &'a self,
        _access_token: &'a str,
        _event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<serde_json::Value>> {
        Box::pin(async move { Err(self.error()) })
    }

    fn watch<'a>(
        &'a self,
        _access_token: &'a str,
        _channel: WatchChannel,
    ) -> BoxFuture<'a, ProviderResult<serde_json::Value>> {
        Box::pin(async move { Err(self.error()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn upcoming_window_spans_a_day() {
        let window = EventWindow::upcoming(now());
        assert_eq!(window.time_min, now());
        assert_eq!(window.time_max - window.time_min, Duration::hours(24));
    }

    #[test]
    fn from_bounds_fills_missing_ends() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let window = EventWindow::from_bounds(Some(start), None, now());
        assert_eq!(window.time_min, start);
        assert_eq!(window.time_max, start + Duration::hours(24));

        let end = Utc.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap();
        let window = EventWindow::from_bounds(None, Some(end), now());
        assert_eq!(window.time_min, now());
        assert_eq!(window.time_max, end);
    }

    #[test]
    fn web_hook_channel_serializes_type() {
        let channel = WatchChannel::web_hook("https://srv/api/calendar/notification", now());
        let json = serde_json::to_value(&channel).unwrap();
        assert_eq!(json["type"], "web_hook");
        assert_eq!(json["id"], format!("watch-{}", now().timestamp_millis()));
        assert_eq!(json["address"], "https://srv/api/calendar/notification");
    }

    #[test]
    fn token_set_tolerates_missing_refresh_token() {
        let tokens: TokenSet =
            serde_json::from_str(r#"{"access_token":"ya29","expires_in":3599,"scope":"x"}"#)
                .unwrap();
        assert_eq!(tokens.access_token, "ya29");
        assert!(tokens.refresh_token.is_none());
        assert_eq!(tokens.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn unconfigured_provider_fails_with_configuration_error() {
        let provider = UnconfiguredProvider::new("GOOGLE_CLIENT_ID is not set");
        let err = provider.exchange_code("code").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(provider.authorization_url().is_err());
        let err = provider
            .list_events("token", EventWindow::upcoming(now()))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "GOOGLE_CLIENT_ID is not set");
    }
}
