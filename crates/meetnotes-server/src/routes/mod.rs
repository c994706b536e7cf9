//! HTTP routes.
//!
//! Everything except `/health` lives under `/api`. Routes behind
//! [`require_session`] need a bearer token.

mod admin;
mod auth;
mod calendar;
mod health;
mod notes;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::middleware;
use axum::routing::{get, post, put};
use meetnotes_protocol::NEW_TOKEN_HEADER;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::auth::require_session;
use crate::config::ServerConfig;
use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let protected = Router::new()
        .route("/auth/verify", get(auth::verify))
        .route("/notes", get(notes::list).post(notes::create))
        .route("/notes/:event_id", get(notes::get).put(notes::update))
        .route("/admin/notes", get(admin::list_notes))
        .route("/admin/notes/:note_id", put(admin::update_note))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:email/role", put(admin::set_role))
        .route("/calendar/upcoming", get(calendar::upcoming))
        .route("/calendar/event/:event_id", get(calendar::event))
        .route("/calendar/watch", post(calendar::watch))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let public = Router::new()
        .route("/auth/google/url", get(auth::google_url))
        .route("/auth/google/callback", get(auth::google_callback))
        .route("/calendar/notification", post(calendar::notification));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", public.merge(protected))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors_layer(&config.allowed_origins()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "ignoring CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([HeaderName::from_static(NEW_TOKEN_HEADER)])
}
