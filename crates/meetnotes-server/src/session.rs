//! Session tokens.
//!
//! A session is an HS256 JWT carrying the user's profile, role and delegated
//! Google credentials. Tokens live for seven days; a token within five
//! minutes of expiry is re-minted with the same claims and a refreshed
//! access token.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use meetnotes_core::Role;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifetime of a freshly minted token.
pub const TOKEN_LIFETIME: Duration = Duration::days(7);

/// How long before expiry a token gets silently refreshed.
pub const REFRESH_LOOKAHEAD: Duration = Duration::minutes(5);

/// Errors raised while reading or minting a session token.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No token provided")]
    Missing,

    #[error("Invalid authorization scheme")]
    Scheme,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Token payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Role at login time. Admin checks re-read the role store.
    #[serde(default)]
    pub role: Role,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Claims for a new session starting at `now`.
    pub fn new(
        email: impl Into<String>,
        role: Role,
        access_token: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            email: email.into(),
            name: None,
            picture: None,
            role,
            access_token: access_token.into(),
            refresh_token: None,
            iat: now.timestamp(),
            exp: (now + TOKEN_LIFETIME).timestamp(),
        }
    }

    pub fn with_profile(mut self, name: Option<String>, picture: Option<String>) -> Self {
        self.name = name;
        self.picture = picture;
        self
    }

    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        self.refresh_token = refresh_token;
        self
    }

    /// True once `now` is inside the refresh window before expiry.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        (now + REFRESH_LOOKAHEAD).timestamp() >= self.exp
    }

    /// Same identity with a new access token and a fresh lifetime.
    pub fn refreshed(&self, access_token: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            iat: now.timestamp(),
            exp: (now + TOKEN_LIFETIME).timestamp(),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for Claims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Claims")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish_non_exhaustive()
    }
}

/// Signing and verification keys.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn mint(&self, claims: &Claims) -> SessionResult<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(SessionError::Signing)
    }

    /// Checks signature and expiry and returns the claims.
    pub fn verify(&self, token: &str) -> SessionResult<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid(e),
            })
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: Option<&str>) -> SessionResult<&str> {
    let header = header.map(str::trim).filter(|h| !h.is_empty());
    let Some(header) = header else {
        return Err(SessionError::Missing);
    };
    let (scheme, token) = header
        .split_once(char::is_whitespace)
        .unwrap_or((header, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(SessionError::Scheme);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(SessionError::Missing);
    }
    Ok(token)
}
