//! Calendar pass-through.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use meetnotes_protocol::CalendarWindow;
use meetnotes_providers::{EventWindow, WatchChannel};
use serde_json::Value;
use tracing::info;

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn upcoming(
    State(state): State<AppState>,
    ctx: AuthContext,
    query: Result<Query<CalendarWindow>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(window) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let window = EventWindow::from_bounds(window.time_min, window.time_max, Utc::now());
    if window.time_max <= window.time_min {
        return Err(ApiError::validation("timeMax must be after timeMin"));
    }

    let events = state
        .calendar
        .list_events(ctx.access_token(), window)
        .await?;
    Ok(Json(events))
}

pub async fn event(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(event_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let event = state
        .calendar
        .get_event(ctx.access_token(), &event_id)
        .await?;
    Ok(Json(event))
}

pub async fn watch(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<Value>, ApiError> {
    let channel = WatchChannel::web_hook(state.links.notification.as_str(), Utc::now());
    let channel_id = channel.id.clone();
    let response = state.calendar.watch(ctx.access_token(), channel).await?;
    info!(email = %ctx.email, channel_id = %channel_id, "calendar watch registered");
    Ok(Json(response))
}

/// Push notification from Google. Unauthenticated; only logged.
pub async fn notification(headers: HeaderMap) -> StatusCode {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-")
            .to_string()
    };
    info!(
        channel_id = %header("x-goog-channel-id"),
        resource_id = %header("x-goog-resource-id"),
        message_number = %header("x-goog-message-number"),
        resource_state = %header("x-goog-resource-state"),
        "calendar notification"
    );
    StatusCode::OK
}
