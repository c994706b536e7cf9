//! Server error types.
//!
//! [`RepositoryError`] is what the note and role repositories return.
//! [`ApiError`] is what handlers return; it renders as the JSON error body
//! with a matching status code. [`ServerError`] covers startup failures.

use std::io;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use meetnotes_core::{AccessDenied, InvalidRole, TracingError};
use meetnotes_protocol::ErrorBody;
use meetnotes_providers::{ProviderError, ProviderErrorCode};
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;
use crate::session::SessionError;
use crate::store::StoreError;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors returned by the note and role repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Denied(#[from] AccessDenied),

    #[error(transparent)]
    InvalidRole(#[from] InvalidRole),

    /// Concurrent writers kept winning the race.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RepositoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// The identity or calendar provider failed.
    #[error("{0}")]
    Upstream(#[from] ProviderError),

    /// Details are logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(err) => match err.code() {
                ProviderErrorCode::ConfigurationError => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short category placed in the `error` field.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "Unauthorized",
            Self::Forbidden(_) => "Forbidden",
            Self::NotFound(_) => "Not Found",
            Self::Validation(_) => "Bad Request",
            Self::Conflict(_) => "Conflict",
            Self::Upstream(_) => "Upstream Error",
            Self::Internal(_) => "Internal Server Error",
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(message) => Self::Validation(message),
            RepositoryError::InvalidRole(err) => Self::Validation(err.to_string()),
            RepositoryError::NotFound(message) => Self::NotFound(message),
            RepositoryError::Denied(denied) => Self::from(denied),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            RepositoryError::Store(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        Self::Forbidden(denied.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Signing(_) => Self::Internal(err.to_string()),
            _ => Self::Unauthenticated(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Internal(details) => {
                error!(error = %details, "request failed");
                "Internal server error".to_string()
            }
            Self::Upstream(err) => err.message().to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorBody::new(self.label(), message))).into_response()
    }
}

/// Result type for server startup.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    #[error("Provider setup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
