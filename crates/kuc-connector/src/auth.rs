//! `OAuth2` client-credentials authentication against the realm token
//! endpoint.

use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::config::KeycloakConfig;
use crate::error::{Error, Result};

/// `OAuth2` token response from Keycloak.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: String,
}

/// Process-lifetime cache for the admin bearer token.
///
/// The token is acquired on first use and reused for every later call;
/// there is no expiry tracking, so a failed acquisition leaves the cache
/// empty for the next caller to retry. The mutex is held across the
/// token request so concurrent first callers produce exactly one hit on
/// the token endpoint.
#[derive(Debug)]
pub struct TokenCache {
    config: KeycloakConfig,
    http_client: reqwest::Client,
    token: Mutex<Option<String>>,
}

impl TokenCache {
    /// Creates a new token cache sharing the connector's HTTP client.
    pub fn new(config: KeycloakConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
            token: Mutex::new(None),
        }
    }

    /// Gets the cached bearer token, acquiring one if none is cached.
    #[instrument(skip(self), fields(realm = %self.config.realm))]
    pub async fn get_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            debug!("Using cached token");
            return Ok(token.clone());
        }

        debug!("Acquiring access token");
        let token = self.acquire_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Acquires a new access token using the client-credentials flow.
    async fn acquire_token(&self) -> Result<String> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
            ("grant_type", "client_credentials"),
            ("scope", "openid"),
        ];

        let response = self
            .http_client
            .post(self.config.token_endpoint())
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Failed to parse token response: {e}")))?;

        debug!("Acquired access token");
        Ok(token_response.access_token)
    }

    /// Clears the cached token, forcing acquisition on next use.
    pub async fn invalidate(&self) {
        let mut cached = self.token.lock().await;
        *cached = None;
    }
}
