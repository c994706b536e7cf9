//! HTTP client for the meetnotes API.
//!
//! Every authenticated call sends the stored bearer token and stores the
//! replacement token when the server returns one in `X-New-Token`.

use chrono::{DateTime, Utc};
use meetnotes_core::{Note, UserRole};
use meetnotes_protocol::{
    AdminNote, AdminUpdateNoteRequest, AuthUrlResponse, CalendarWindow, CreateNoteRequest,
    ErrorBody, HealthResponse, MessageResponse, NEW_TOKEN_HEADER, NoteResponse, NotesResponse,
    SetRoleRequest, UpdateNoteRequest, UserProfile, VerifyResponse,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::token::TokenStore;

/// Client for the meetnotes server.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("meetnotes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            tokens: TokenStore::new(config.token_path()),
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        self.read(response).await
    }

    async fn send_authed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<T> {
        let token = self.tokens.require()?;
        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        debug!(method = %method, path = %path, "sending request");

        let response = request.send().await?;
        self.store_refreshed_token(&response);
        self.read(response).await
    }

    fn store_refreshed_token(&self, response: &Response) {
        let Some(value) = response.headers().get(NEW_TOKEN_HEADER) else {
            return;
        };
        match value.to_str() {
            Ok(token) => match self.tokens.save(token) {
                Ok(()) => info!("session token refreshed"),
                Err(e) => warn!(error = %e, "failed to store refreshed token"),
            },
            Err(e) => warn!(error = %e, "ignoring unreadable refreshed token"),
        }
    }

    async fn read<T: DeserializeOwned>(&self, response: Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) if !body.message.is_empty() => body.message,
            Ok(body) => body.error,
            Err(_) if text.is_empty() => status.to_string(),
            Err(_) => text,
        };
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::AuthRequired(format!(
                "{}, run `meetnotes login`",
                message
            )));
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // --- public endpoints ---

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.send(self.http.get(self.url("/health"))).await
    }

    pub async fn auth_url(&self) -> ClientResult<String> {
        let response: AuthUrlResponse = self
            .send(self.http.get(self.url("/api/auth/google/url")))
            .await?;
        Ok(response.url)
    }

    // --- session ---

    pub async fn verify(&self) -> ClientResult<UserProfile> {
        let response: VerifyResponse = self
            .send_authed(Method::GET, "/api/auth/verify", None)
            .await?;
        Ok(response.user)
    }

    // --- notes ---

    pub async fn list_notes(&self) -> ClientResult<Vec<Note>> {
        let response: NotesResponse = self.send_authed(Method::GET, "/api/notes", None).await?;
        Ok(response.notes)
    }

    pub async fn get_note(&self, event_id: &str) -> ClientResult<Note> {
        let path = format!("/api/notes/{}", segment(event_id));
        let response: NoteResponse = self.send_authed(Method::GET, &path, None).await?;
        Ok(response.note)
    }

    pub async fn create_note(&self, event_id: &str, content: &str) -> ClientResult<Note> {
        let body = CreateNoteRequest {
            event_id: Some(event_id.to_string()),
            content: Some(content.to_string()),
        };
        let response: NoteResponse = self
            .send_authed(Method::POST, "/api/notes", json_body(&body)?)
            .await?;
        Ok(response.note)
    }

    pub async fn update_note(&self, event_id: &str, content: &str) -> ClientResult<Note> {
        let path = format!("/api/notes/{}", segment(event_id));
        let body = UpdateNoteRequest::new(content);
        let response: NoteResponse = self
            .send_authed(Method::PUT, &path, json_body(&body)?)
            .await?;
        Ok(response.note)
    }

    // --- admin ---

    pub async fn admin_notes(&self) -> ClientResult<Vec<AdminNote>> {
        self.send_authed(Method::GET, "/api/admin/notes", None).await
    }

    pub async fn admin_update_note(&self, note_id: &str, content: &str) -> ClientResult<String> {
        let path = format!("/api/admin/notes/{}", segment(note_id));
        let body = AdminUpdateNoteRequest {
            content: Some(content.to_string()),
            path: None,
        };
        let response: MessageResponse = self
            .send_authed(Method::PUT, &path, json_body(&body)?)
            .await?;
        Ok(response.message)
    }

    pub async fn admin_users(&self) -> ClientResult<Vec<UserRole>> {
        self.send_authed(Method::GET, "/api/admin/users", None).await
    }

    pub async fn set_role(&self, email: &str, role: &str) -> ClientResult<String> {
        let path = format!("/api/admin/users/{}/role", segment(email));
        let body = SetRoleRequest {
            role: Some(role.to_string()),
        };
        let response: MessageResponse = self
            .send_authed(Method::PUT, &path, json_body(&body)?)
            .await?;
        Ok(response.message)
    }

    // --- calendar ---

    pub async fn upcoming(
        &self,
        time_min: Option<DateTime<Utc>>,
        time_max: Option<DateTime<Utc>>,
    ) -> ClientResult<Value> {
        let window = CalendarWindow { time_min, time_max };
        let query = window_query(&window);
        let path = if query.is_empty() {
            "/api/calendar/upcoming".to_string()
        } else {
            format!("/api/calendar/upcoming?{}", query)
        };
        self.send_authed(Method::GET, &path, None).await
    }

    pub async fn event(&self, event_id: &str) -> ClientResult<Value> {
        let path = format!("/api/calendar/event/{}", segment(event_id));
        self.send_authed(Method::GET, &path, None).await
    }

    pub async fn watch(&self) -> ClientResult<Value> {
        self.send_authed(Method::POST, "/api/calendar/watch", None)
            .await
    }
}

fn json_body<T: Serialize>(body: &T) -> ClientResult<Option<Value>> {
    serde_json::to_value(body)
        .map(Some)
        .map_err(|e| ClientError::Protocol(format!("failed to encode request: {}", e)))
}

/// Percent-encodes one path segment.
fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn window_query(window: &CalendarWindow) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(min) = window.time_min {
        query.append_pair("timeMin", &min.to_rfc3339());
    }
    if let Some(max) = window.time_max {
        query.append_pair("timeMax", &max.to_rfc3339());
    }
    query.finish()
}
