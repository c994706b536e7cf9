//! HTTP API tests driving the router with mock Google providers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use chrono::{Duration, Utc};
use meetnotes_core::Role;
use meetnotes_protocol::NEW_TOKEN_HEADER;
use meetnotes_providers::{
    BoxFuture, CalendarApi, EventWindow, IdentityProfile, IdentityProvider, ProviderError,
    ProviderResult, TokenSet, UnconfiguredProvider, WatchChannel,
};
use meetnotes_server::session::TOKEN_LIFETIME;
use meetnotes_server::{AppState, Claims, MemoryStore, ServerConfig, router};
use serde_json::{Value, json};
use tower::ServiceExt;

const OWNER: &str = "owner@x.com";
const SECRET: &str = "integration-secret";

/// Codes look like `code-<email>`; access tokens like `access-<email>`.
#[derive(Default)]
struct MockIdentity {
    refreshes: AtomicUsize,
}

impl IdentityProvider for MockIdentity {
    fn name(&self) -> &str {
        "mock"
    }

    fn authorization_url(&self) -> ProviderResult<String> {
        Ok("https://accounts.example.com/auth?access_type=offline".to_string())
    }

    fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<TokenSet>> {
        Box::pin(async move {
            let email = code
                .strip_prefix("code-")
                .ok_or_else(|| ProviderError::from_status(400, "invalid_grant"))?;
            Ok(TokenSet {
                access_token: format!("access-{}", email),
                refresh_token: Some("refresh-ok".to_string()),
                expires_in: Some(3600),
            })
        })
    }

    fn refresh_access_token<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            if refresh_token == "refresh-ok" {
                Ok("access-refreshed".to_string())
            } else {
                Err(ProviderError::from_status(400, "invalid_grant"))
            }
        })
    }

    fn user_info<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<IdentityProfile>> {
        Box::pin(async move {
            let email = access_token
                .strip_prefix("access-")
                .ok_or_else(|| ProviderError::from_status(401, "bad token"))?;
            Ok(IdentityProfile {
                email: email.to_string(),
                name: Some("Test User".to_string()),
                picture: Some("https://example.com/p.png".to_string()),
            })
        })
    }
}

/// Echoes what it was asked for.
struct MockCalendar;

impl CalendarApi for MockCalendar {
    fn list_events<'a>(
        &'a self,
        access_token: &'a str,
        window: EventWindow,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(async move {
            Ok(json!([{
                "id": "e1",
                "token": access_token,
                "hours": (window.time_max - window.time_min).num_hours(),
            }]))
        })
    }

    fn get_event<'a>(
        &'a self,
        access_token: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(async move {
            if event_id == "missing" {
                return Err(ProviderError::from_status(404, "Not Found"));
            }
            Ok(json!({"id": event_id, "token": access_token}))
        })
    }

    fn watch<'a>(
        &'a self,
        _access_token: &'a str,
        channel: WatchChannel,
    ) -> BoxFuture<'a, ProviderResult<Value>> {
        Box::pin(async move { Ok(json!({"id": channel.id, "address": channel.address})) })
    }
}

struct TestApp {
    router: Router,
    state: AppState,
    identity: Arc<MockIdentity>,
}

impl TestApp {
    fn new() -> Self {
        let identity = Arc::new(MockIdentity::default());
        let calendar: Arc<dyn CalendarApi> = Arc::new(MockCalendar);
        Self::with_providers(identity.clone(), identity, calendar)
    }

    fn unconfigured() -> Self {
        let provider = Arc::new(UnconfiguredProvider::new("not configured"));
        Self::with_providers(Arc::new(MockIdentity::default()), provider.clone(), provider)
    }

    fn with_providers(
        mock: Arc<MockIdentity>,
        identity: Arc<dyn IdentityProvider>,
        calendar: Arc<dyn CalendarApi>,
    ) -> Self {
        let config = ServerConfig::new(OWNER)
            .with_ephemeral(true)
            .with_jwt_secret(SECRET)
            .with_server_url("https://api.example.com");
        let state = AppState::new(&config, Arc::new(MemoryStore::new()), identity, calendar);
        Self {
            router: router(state.clone(), &config),
            state,
            identity: mock,
        }
    }

    fn token(&self, email: &str, role: Role) -> String {
        let claims = Claims::new(email, role, format!("access-{}", email), Utc::now());
        self.state.sessions.mint(&claims).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, headers, body)
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, _, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK"}));
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = TestApp::new();
    for uri in ["/api/notes", "/api/auth/verify", "/api/admin/users", "/api/calendar/upcoming"] {
        let (status, _, body) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "No token provided");
    }

    let (status, _, body) = app
        .send(Method::GET, "/api/notes", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn foreign_and_expired_tokens_are_rejected() {
    let app = TestApp::new();

    let forged = meetnotes_server::SessionKeys::new(b"other-secret")
        .mint(&Claims::new("a@x.com", Role::Owner, "t", Utc::now()))
        .unwrap();
    let (status, _, _) = app.send(Method::GET, "/api/notes", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = app
        .state
        .sessions
        .mint(&Claims::new(
            "a@x.com",
            Role::Regular,
            "t",
            Utc::now() - TOKEN_LIFETIME - Duration::minutes(1),
        ))
        .unwrap();
    let (status, _, _) = app.send(Method::GET, "/api/notes", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_returns_profile() {
    let app = TestApp::new();
    let claims = Claims::new("a@x.com", Role::Regular, "access-a@x.com", Utc::now())
        .with_profile(Some("Alice".into()), None);
    let token = app.state.sessions.mint(&claims).unwrap();

    let (status, _, body) = app
        .send(Method::GET, "/api/auth/verify", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "user": {"email": "a@x.com", "name": "Alice", "picture": null}})
    );
}

#[tokio::test]
async fn draft_to_final_scenario() {
    let app = TestApp::new();
    let alice = app.token("a@x.com", Role::Regular);
    let bob = app.token("b@x.com", Role::Regular);

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/notes",
            Some(&alice),
            Some(json!({"eventId": "e1", "content": "draft"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"]["content"], "draft");
    assert_eq!(body["note"]["userEmail"], "a@x.com");

    let (status, _, _) = app
        .send(
            Method::PUT,
            "/api/notes/e1",
            Some(&alice),
            Some(json!({"content": "final"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = app.send(Method::GET, "/api/notes/e1", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let note = &body["note"];
    assert_eq!(note["content"], "final");
    assert_eq!(note["versions"].as_array().unwrap().len(), 1);
    assert_eq!(note["versions"][0]["content"], "draft");
    assert_eq!(note["versions"][0]["editor"], "a@x.com");
    assert!(note["updatedAt"].as_i64().unwrap() > note["versions"][0]["timestamp"].as_i64().unwrap());

    let (status, _, body) = app.send(Method::GET, "/api/notes/e1", Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You do not have access to this note");

    let (status, _, _) = app
        .send(
            Method::PUT,
            "/api/notes/e1",
            Some(&bob),
            Some(json!({"content": "hijack"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = app
        .send(
            Method::POST,
            "/api/notes",
            Some(&bob),
            Some(json!({"eventId": "e1", "content": "hijack"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.state.roles.set_role("admin@x.com", "ADMIN").await.unwrap();
    let admin = app.token("admin@x.com", Role::Admin);
    let (status, _, body) = app
        .send(Method::GET, "/api/admin/notes", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let notes = body.as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["id"], "e1");
    assert_eq!(notes[0]["userEmail"], "a@x.com");
    assert_eq!(notes[0]["path"], "notes/e1");
    assert_eq!(notes[0]["content"], "final");
}

#[tokio::test]
async fn upsert_on_missing_note_creates_then_versions() {
    let app = TestApp::new();
    let alice = app.token("a@x.com", Role::Regular);

    for content in ["one", "two"] {
        let (status, _, _) = app
            .send(
                Method::PUT,
                "/api/notes/fresh",
                Some(&alice),
                Some(json!({"content": content})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, _, body) = app.send(Method::GET, "/api/notes/fresh", Some(&alice), None).await;
    assert_eq!(body["note"]["content"], "two");
    assert_eq!(body["note"]["versions"].as_array().unwrap().len(), 1);
    assert_eq!(body["note"]["createdBy"], "a@x.com");
}

#[tokio::test]
async fn note_listing_and_validation() {
    let app = TestApp::new();
    let alice = app.token("a@x.com", Role::Regular);
    let bob = app.token("b@x.com", Role::Regular);

    for (token, event) in [(&alice, "e1"), (&bob, "e2"), (&alice, "e3")] {
        app.send(
            Method::POST,
            "/api/notes",
            Some(token),
            Some(json!({"eventId": event, "content": "x"})),
        )
        .await;
        tokio::time::sleep(std::time::Duration::from_millis(3)).await;
    }

    let (status, _, body) = app.send(Method::GET, "/api/notes", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["notes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["eventId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["e3", "e1"]);

    let (status, _, body) = app
        .send(Method::POST, "/api/notes", Some(&alice), Some(json!({"content": "x"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let (status, _, _) = app
        .send(
            Method::PUT,
            "/api/notes/e1",
            Some(&alice),
            Some(json!({"content": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = app.send(Method::GET, "/api/notes/nope", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Note not found");
}

#[tokio::test]
async fn admin_routes_use_the_stored_role() {
    let app = TestApp::new();

    // Claims ADMIN, but the role store says REGULAR.
    let stale = app.token("c@x.com", Role::Admin);
    let (status, _, _) = app.send(Method::GET, "/api/admin/users", Some(&stale), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Promoted after the token was issued.
    app.state.roles.set_role("d@x.com", "ADMIN").await.unwrap();
    let promoted = app.token("d@x.com", Role::Regular);
    let (status, _, body) = app
        .send(Method::GET, "/api/admin/users", Some(&promoted), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, ["c@x.com", "d@x.com"]);
    assert_eq!(body[1]["role"], "ADMIN");
    assert!(body[1]["createdAt"].is_string());
}

#[tokio::test]
async fn admin_note_edit() {
    let app = TestApp::new();
    let alice = app.token("a@x.com", Role::Regular);
    app.state.roles.set_role("admin@x.com", "ADMIN").await.unwrap();
    let admin = app.token("admin@x.com", Role::Admin);

    app.send(
        Method::POST,
        "/api/notes",
        Some(&alice),
        Some(json!({"eventId": "e1", "content": "draft"})),
    )
    .await;

    let (status, _, _) = app
        .send(
            Method::PUT,
            "/api/admin/notes/e1",
            Some(&alice),
            Some(json!({"content": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = app
        .send(
            Method::PUT,
            "/api/admin/notes/e1",
            Some(&admin),
            Some(json!({"content": "x", "path": "notes/other"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app
        .send(
            Method::PUT,
            "/api/admin/notes/missing",
            Some(&admin),
            Some(json!({"content": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = app
        .send(
            Method::PUT,
            "/api/admin/notes/e1",
            Some(&admin),
            Some(json!({"content": "reviewed", "path": "notes/e1"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Note updated successfully"}));

    let (_, _, body) = app.send(Method::GET, "/api/notes/e1", Some(&alice), None).await;
    let note = &body["note"];
    assert_eq!(note["content"], "reviewed");
    assert_eq!(note["lastEditor"], "admin@x.com");
    assert_eq!(note["userEmail"], "a@x.com");
    assert_eq!(note["versions"][0]["content"], "draft");
}

#[tokio::test]
async fn role_changes_are_owner_only() {
    let app = TestApp::new();
    let owner = app.token(OWNER, Role::Owner);
    app.state.roles.set_role("admin@x.com", "ADMIN").await.unwrap();
    let admin = app.token("admin@x.com", Role::Admin);
    app.state.roles.ensure_owner_initialized().await.unwrap();

    let (status, _, _) = app
        .send(
            Method::PUT,
            "/api/admin/users/b@x.com/role",
            Some(&admin),
            Some(json!({"role": "ADMIN"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = app
        .send(
            Method::PUT,
            "/api/admin/users/b@x.com/role",
            Some(&admin),
            Some(json!({"role": "EMPEROR"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = app
        .send(
            Method::PUT,
            "/api/admin/users/b@x.com/role",
            Some(&owner),
            Some(json!({"role": "ADMIN"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User role updated successfully");
    assert_eq!(app.state.roles.get_role("b@x.com").await.unwrap(), Role::Admin);

    let (status, _, body) = app
        .send(
            Method::PUT,
            "/api/admin/users/b@x.com/role",
            Some(&owner),
            Some(json!({"role": "EMPEROR"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid role: EMPEROR");

    let uri = format!("/api/admin/users/{}/role", OWNER);
    let (status, _, body) = app
        .send(Method::PUT, &uri, Some(&owner), Some(json!({"role": "ADMIN"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Cannot modify owner role");

    let (status, _, _) = app
        .send(Method::PUT, &uri, Some(&owner), Some(json!({"role": "OWNER"})))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn oauth_callback_signs_in() {
    let app = TestApp::new();

    let (status, _, body) = app.send(Method::GET, "/api/auth/google/url", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["url"].as_str().unwrap().contains("access_type=offline"));

    let (status, _, _) = app
        .send(Method::GET, "/api/auth/google/callback", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, headers, _) = app
        .send(Method::GET, "/api/auth/google/callback?code=code-a@x.com", None, None)
        .await;
    assert_eq!(status, StatusCode::FOUND);
    let location = headers[header::LOCATION].to_str().unwrap();
    let prefix = "http://localhost:3000/auth/google/callback?token=";
    assert!(location.starts_with(prefix), "{}", location);

    let query = &location[location.find('?').unwrap() + 1..];
    let mut token = None;
    let mut user = None;
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap();
        let value = urlencoding::decode(value).unwrap().into_owned();
        match key {
            "token" => token = Some(value),
            "user" => user = Some(value),
            _ => {}
        }
    }
    let user: Value = serde_json::from_str(&user.unwrap()).unwrap();
    assert_eq!(user["email"], "a@x.com");
    assert_eq!(user["name"], "Test User");

    let claims = app.state.sessions.verify(&token.unwrap()).unwrap();
    assert_eq!(claims.role, Role::Regular);
    assert_eq!(claims.access_token, "access-a@x.com");
    assert_eq!(claims.refresh_token.as_deref(), Some("refresh-ok"));
    assert_eq!(app.state.roles.list_all().await.unwrap().len(), 1);

    let (status, _, _) = app
        .send(Method::GET, "/api/auth/google/callback?code=garbage", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn owner_login_heals_owner_role() {
    let app = TestApp::new();
    let uri = format!("/api/auth/google/callback?code=code-{}", OWNER);
    let (status, headers, _) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::FOUND);
    assert!(headers.contains_key(header::LOCATION));
    assert_eq!(app.state.roles.get_role(OWNER).await.unwrap(), Role::Owner);
}

fn near_expiry(app: &TestApp, refresh_token: Option<&str>) -> String {
    let issued = Utc::now() - TOKEN_LIFETIME + Duration::minutes(2);
    let claims = Claims::new("a@x.com", Role::Regular, "access-old", issued)
        .with_refresh_token(refresh_token.map(str::to_string));
    app.state.sessions.mint(&claims).unwrap()
}

#[tokio::test]
async fn near_expiry_token_is_refreshed() {
    let app = TestApp::new();
    let token = near_expiry(&app, Some("refresh-ok"));

    let (status, headers, body) = app
        .send(Method::GET, "/api/calendar/upcoming", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    // The handler already sees the refreshed access token.
    assert_eq!(body[0]["token"], "access-refreshed");

    let new_token = headers[NEW_TOKEN_HEADER].to_str().unwrap();
    let claims = app.state.sessions.verify(new_token).unwrap();
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.access_token, "access-refreshed");
    assert_eq!(claims.refresh_token.as_deref(), Some("refresh-ok"));
    assert!(!claims.needs_refresh(Utc::now()));
    assert_eq!(app.identity.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_refresh_still_authorizes() {
    let app = TestApp::new();
    let token = near_expiry(&app, Some("refresh-revoked"));

    let (status, headers, body) = app
        .send(Method::GET, "/api/calendar/upcoming", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["token"], "access-old");
    assert!(!headers.contains_key(NEW_TOKEN_HEADER));
    assert_eq!(app.identity.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fresh_or_refreshless_tokens_are_left_alone() {
    let app = TestApp::new();

    let (_, headers, _) = app
        .send(Method::GET, "/api/notes", Some(&near_expiry(&app, None)), None)
        .await;
    assert!(!headers.contains_key(NEW_TOKEN_HEADER));

    let (_, headers, _) = app
        .send(Method::GET, "/api/notes", Some(&app.token("a@x.com", Role::Regular)), None)
        .await;
    assert!(!headers.contains_key(NEW_TOKEN_HEADER));
    assert_eq!(app.identity.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn calendar_pass_through() {
    let app = TestApp::new();
    let token = app.token("a@x.com", Role::Regular);

    let (status, _, body) = app
        .send(Method::GET, "/api/calendar/upcoming", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["token"], "access-a@x.com");
    assert_eq!(body[0]["hours"], 24);

    let uri = "/api/calendar/upcoming?timeMin=2025-01-01T00:00:00Z&timeMax=2025-01-03T00:00:00Z";
    let (status, _, body) = app.send(Method::GET, uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["hours"], 48);

    let uri = "/api/calendar/upcoming?timeMin=2025-01-03T00:00:00Z&timeMax=2025-01-01T00:00:00Z";
    let (status, _, _) = app.send(Method::GET, uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = app
        .send(Method::GET, "/api/calendar/event/e9", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": "e9", "token": "access-a@x.com"}));

    let (status, _, body) = app
        .send(Method::GET, "/api/calendar/event/missing", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Upstream Error");

    let (status, _, body) = app
        .send(Method::POST, "/api/calendar/watch", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["id"].as_str().unwrap().starts_with("watch-"));
    assert_eq!(
        body["address"],
        "https://api.example.com/api/calendar/notification"
    );
}

#[tokio::test]
async fn calendar_notification_is_public() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/calendar/notification")
        .header("x-goog-channel-id", "watch-1")
        .header("x-goog-resource-state", "exists")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unconfigured_google_answers_503() {
    let app = TestApp::unconfigured();

    let (status, _, _) = app.send(Method::GET, "/api/auth/google/url", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let token = app.token("a@x.com", Role::Regular);
    let (status, _, _) = app
        .send(Method::GET, "/api/calendar/upcoming", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Notes do not depend on Google.
    let (status, _, _) = app.send(Method::GET, "/api/notes", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cors_exposes_refreshed_token_header() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    let exposed = headers[header::ACCESS_CONTROL_EXPOSE_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains(NEW_TOKEN_HEADER));
}
