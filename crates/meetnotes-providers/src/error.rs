//! Error types for identity and calendar provider calls.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The code, access token or refresh token was rejected.
    AuthenticationFailed,
    /// The token is valid but lacks permission for the resource.
    AuthorizationFailed,
    /// Connection failed, timed out or the body could not be read.
    NetworkError,
    RateLimited,
    /// The upstream returned a 5xx or another unexpected status.
    ServerError,
    /// The upstream answered with a body we could not parse.
    InvalidResponse,
    NotFound,
    BadRequest,
    /// Missing or invalid client configuration.
    ConfigurationError,
}

impl ProviderErrorCode {
    /// Returns true if the operation may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by an upstream identity or calendar service.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// Upstream status code, when the failure came from an HTTP response.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthorizationFailed, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RateLimited, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::BadRequest, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Maps an unsuccessful upstream status to an error, keeping the body as
    /// the message.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let code = match status {
            400 => ProviderErrorCode::BadRequest,
            401 => ProviderErrorCode::AuthenticationFailed,
            403 => ProviderErrorCode::AuthorizationFailed,
            404 | 410 => ProviderErrorCode::NotFound,
            429 => ProviderErrorCode::RateLimited,
            _ => ProviderErrorCode::ServerError,
        };
        let mut err = Self::new(code, format!("upstream returned {}: {}", status, body));
        err.status = Some(status);
        err
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timeout".to_string()
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else if err.is_decode() {
            return Self::invalid_response(format!("failed to decode response: {}", err))
                .with_source(err);
        } else {
            format!("request failed: {}", err)
        };
        Self::network(message).with_source(err)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_retryable() {
        assert!(ProviderErrorCode::NetworkError.is_retryable());
        assert!(ProviderErrorCode::RateLimited.is_retryable());
        assert!(!ProviderErrorCode::AuthenticationFailed.is_retryable());
        assert!(!ProviderErrorCode::NotFound.is_retryable());
    }

    #[test]
    fn from_status_classifies_codes() {
        let cases = [
            (400, ProviderErrorCode::BadRequest),
            (401, ProviderErrorCode::AuthenticationFailed),
            (403, ProviderErrorCode::AuthorizationFailed),
            (404, ProviderErrorCode::NotFound),
            (410, ProviderErrorCode::NotFound),
            (429, ProviderErrorCode::RateLimited),
            (500, ProviderErrorCode::ServerError),
            (503, ProviderErrorCode::ServerError),
        ];
        for (status, code) in cases {
            let err = ProviderError::from_status(status, "body");
            assert_eq!(err.code(), code, "status {}", status);
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn display_includes_code_and_upstream_body() {
        let err = ProviderError::from_status(404, r#"{"error":"notFound"}"#);
        let display = err.to_string();
        assert!(display.starts_with("not_found:"));
        assert!(display.contains("notFound"));
    }

    #[test]
    fn with_source_is_exposed() {
        use std::error::Error;
        let io_err = std::io::Error::other("reset");
        let err = ProviderError::network("send failed").with_source(io_err);
        assert!(err.source().is_some());
        assert!(err.status().is_none());
    }
}
