//! Login and session verification.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use meetnotes_core::Role;
use meetnotes_protocol::{AuthUrlResponse, UserProfile, VerifyResponse};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::session::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    error: Option<String>,
}

pub async fn google_url(State(state): State<AppState>) -> Result<Json<AuthUrlResponse>, ApiError> {
    let url = state.identity.authorization_url()?;
    Ok(Json(AuthUrlResponse { url }))
}

/// OAuth redirect target: signs the user in and bounces the browser back to
/// the client with a session token.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    if let Some(error) = query.error.as_deref() {
        warn!(error = %error, "authorization was not granted");
    }
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::validation("Authorization code is required"))?;

    let tokens = state.identity.exchange_code(&code).await?;
    let profile = state.identity.user_info(&tokens.access_token).await?;

    let (mut role, created) = state.roles.get_or_create(&profile.email).await?;
    if state.roles.owner().matches(&profile.email) {
        if state.roles.ensure_owner_initialized().await? {
            info!(email = %profile.email, "owner role healed at login");
        }
        role = Role::Owner;
    }
    if created {
        info!(email = %profile.email, role = %role, "first login");
    }

    let claims = Claims::new(&profile.email, role, tokens.access_token, Utc::now())
        .with_profile(profile.name.clone(), profile.picture.clone())
        .with_refresh_token(tokens.refresh_token);
    let token = state.sessions.mint(&claims)?;

    let user = UserProfile {
        email: profile.email,
        name: profile.name,
        picture: profile.picture,
    };
    let user = serde_json::to_string(&user).map_err(|e| ApiError::internal(e.to_string()))?;
    let location = format!(
        "{}?token={}&user={}",
        state.links.client_callback,
        urlencoding::encode(&token),
        urlencoding::encode(&user)
    );
    info!(email = %claims.email, "signed in");

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

pub async fn verify(ctx: AuthContext) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        success: true,
        user: ctx.profile(),
    })
}
