//! Google Calendar API v3 client.
//!
//! Every call carries the caller's own access token; the client itself holds
//! no credentials.

use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, CalendarApi, EventWindow, WatchChannel};

use super::config::GoogleConfig;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar client.
#[derive(Debug)]
pub struct GoogleCalendar {
    http_client: reqwest::Client,
    calendar_id: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl GoogleCalendar {
    pub fn new(config: &GoogleConfig) -> ProviderResult<Self> {
        Ok(Self {
            http_client: config.http_client()?,
            calendar_id: config.calendar_id.clone(),
            base_url: CALENDAR_API_BASE.to_string(),
        })
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }

    /// Sends a request and returns the JSON body, mapping HTTP failures.
    async fn send_json<T>(request: reqwest::RequestBuilder) -> ProviderResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(ProviderError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;
        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
        })
    }

    async fn list(
        &self,
        access_token: &str,
        window: EventWindow,
    ) -> ProviderResult<serde_json::Value> {
        let url = self.events_url();
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(&url)
                .bearer_auth(access_token)
                .query(&[
                    ("timeMin", window.time_min.to_rfc3339()),
                    ("timeMax", window.time_max.to_rfc3339()),
                    ("singleEvents", "true".to_string()),
                    ("orderBy", "startTime".to_string()),
                ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: EventListResponse = Self::send_json(request).await?;
            events.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = events.len(), calendar = %self.calendar_id, "listed events");
        Ok(serde_json::Value::Array(events))
    }

    async fn get(&self, access_token: &str, event_id: &str) -> ProviderResult<serde_json::Value> {
        let url = format!("{}/{}", self.events_url(), urlencoding::encode(event_id));
        let request = self.http_client.get(&url).bearer_auth(access_token);
        Self::send_json(request).await
    }

    async fn register_watch(
        &self,
        access_token: &str,
        channel: WatchChannel,
    ) -> ProviderResult<serde_json::Value> {
        let url = format!("{}/watch", self.events_url());
        let request = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(&channel);
        let resource: serde_json::Value = Self::send_json(request).await?;
        debug!(channel_id = %channel.id, "registered calendar watch channel");
        Ok(resource)
    }
}

impl CalendarApi for GoogleCalendar {
    fn list_events<'a>(
        &'a self,
        access_token: &'a str,
        window: EventWindow,
    ) -> BoxFuture<'a, ProviderResult<serde_json::Value>> {
        Box::pin(self.list(access_token, window))
    }

    fn get_event<'a>(
        &'a self,
        access_token: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<serde_json::Value>> {
        Box::pin(self.get(access_token, event_id))
    }

    fn watch<'a>(
        &'a self,
        access_token: &'a str,
        channel: WatchChannel,
    ) -> BoxFuture<'a, ProviderResult<serde_json::Value>> {
        Box::pin(self.register_watch(access_token, channel))
    }
}
