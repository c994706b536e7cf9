//! OAuth 2.0 authorization-code flow for a Google web client.
//!
//! The browser leg is handled by the caller: [`GoogleOAuth::authorization_url`]
//! yields the consent URL and Google redirects back to the configured
//! redirect URI with a `code`, which is then exchanged here. Consent is
//! always forced so that Google issues a refresh token on every login.

use tracing::{debug, info};
use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, IdentityProfile, IdentityProvider, TokenSet};

use super::config::GoogleConfig;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Google identity provider.
#[derive(Debug)]
pub struct GoogleOAuth {
    config: GoogleConfig,
    http_client: reqwest::Client,
}

impl GoogleOAuth {
    /// Creates a client after validating `config`.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate()?;
        let http_client = config.http_client()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Builds the consent URL with offline access and forced consent.
    pub fn build_auth_url(config: &GoogleConfig) -> ProviderResult<String> {
        let scope = config.scopes.join(" ");
        let url = Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", config.credentials.client_id.as_str()),
                ("redirect_uri", config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| ProviderError::configuration(format!("invalid auth URL: {}", e)))?;
        Ok(url.into())
    }

    /// Posts a form to the token endpoint and parses the response.
    async fn token_request(&self, params: &[(&str, &str)], what: &str) -> ProviderResult<TokenSet> {
        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(params)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "{} failed ({}): {}",
                what, status, body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("invalid token response: {}", e)))
    }

    async fn exchange(&self, code: &str) -> ProviderResult<TokenSet> {
        let credentials = &self.config.credentials;
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        let tokens = self.token_request(&params, "token exchange").await?;
        info!(
            has_refresh_token = tokens.refresh_token.is_some(),
            "exchanged authorization code"
        );
        Ok(tokens)
    }

    async fn refresh(&self, refresh_token: &str) -> ProviderResult<String> {
        let credentials = &self.config.credentials;
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let tokens = self.token_request(&params, "token refresh").await?;
        debug!(expires_in = ?tokens.expires_in, "refreshed access token");
        Ok(tokens.access_token)
    }

    async fn profile(&self, access_token: &str) -> ProviderResult<IdentityProfile> {
        let response = self
            .http_client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let profile: IdentityProfile = response.json().await?;
        if profile.email.is_empty() {
            return Err(ProviderError::invalid_response(
                "profile response has no email",
            ));
        }
        Ok(profile)
    }
}

impl IdentityProvider for GoogleOAuth {
    fn name(&self) -> &str {
        "google"
    }

    fn authorization_url(&self) -> ProviderResult<String> {
        Self::build_auth_url(&self.config)
    }

    fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<TokenSet>> {
        Box::pin(self.exchange(code))
    }

    fn refresh_access_token<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(self.refresh(refresh_token))
    }

    fn user_info<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<IdentityProfile>> {
        Box::pin(self.profile(access_token))
    }
}
