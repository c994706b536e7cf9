//! Request authentication.
//!
//! [`require_session`] runs in front of every protected route: it verifies
//! the bearer token, silently refreshes it when close to expiry and hands the
//! caller's identity to handlers as an [`AuthContext`].

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use meetnotes_core::{Actor, Role};
use meetnotes_protocol::{NEW_TOKEN_HEADER, UserProfile};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::roles::RoleStore;
use crate::session::{Claims, bearer_token};
use crate::state::AppState;

/// The authenticated caller.
#[derive(Clone)]
pub struct AuthContext {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    /// Role claimed by the token. May be stale; admin routes re-read it.
    pub role: Role,
    access_token: String,
}

impl AuthContext {
    /// Google access token delegated by the caller.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The caller as seen by the standard note endpoints.
    pub fn actor(&self) -> Actor<'_> {
        Actor::new(&self.email, self.role)
    }

    /// The caller with the role currently on record.
    pub async fn current_actor(&self, roles: &RoleStore) -> Result<Actor<'_>, ApiError> {
        let role = roles.get_role(&self.email).await?;
        if role != self.role {
            debug!(
                email = %self.email,
                claimed = %self.role,
                current = %role,
                "token role is stale"
            );
        }
        Ok(Actor::new(&self.email, role))
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            name: self.name.clone(),
            picture: self.picture.clone(),
        }
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
            role: claims.role,
            access_token: claims.access_token,
        }
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::unauthenticated("No token provided"))
    }
}

/// Middleware guarding authenticated routes.
///
/// Missing, malformed, expired or forged tokens end the request with 401.
/// A re-minted token is returned in the `X-New-Token` header.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let claims = bearer_token(header)
        .and_then(|token| state.sessions.verify(token))
        .inspect_err(|e| debug!(error = %e, path = %request.uri().path(), "rejected session"))?;

    let (claims, new_token) = refresh_if_needed(&state, claims, Utc::now()).await;
    request.extensions_mut().insert(AuthContext::from(claims));

    let mut response = next.run(request).await;
    if let Some(token) = new_token {
        match HeaderValue::from_str(&token) {
            Ok(value) => {
                response.headers_mut().insert(NEW_TOKEN_HEADER, value);
            }
            Err(e) => warn!(error = %e, "refreshed token is not a valid header value"),
        }
    }
    Ok(response)
}

/// Re-mints the session when it is close to expiry.
///
/// Returns the claims the request proceeds with and the new token, if one
/// was minted. Any failure keeps the current, still valid, claims.
async fn refresh_if_needed(
    state: &AppState,
    claims: Claims,
    now: DateTime<Utc>,
) -> (Claims, Option<String>) {
    if !claims.needs_refresh(now) {
        return (claims, None);
    }
    let Some(refresh_token) = claims.refresh_token.as_deref() else {
        debug!(email = %claims.email, "token near expiry without refresh token");
        return (claims, None);
    };

    let access_token = match state.identity.refresh_access_token(refresh_token).await {
        Ok(token) => token,
        Err(e) => {
            warn!(
                email = %claims.email,
                error = %e,
                "token refresh failed, continuing with current token"
            );
            return (claims, None);
        }
    };

    let refreshed = claims.refreshed(access_token, now);
    match state.sessions.mint(&refreshed) {
        Ok(token) => {
            info!(email = %refreshed.email, "session token refreshed");
            (refreshed, Some(token))
        }
        Err(e) => {
            warn!(email = %claims.email, error = %e, "failed to sign refreshed token");
            (claims, None)
        }
    }
}
