//! Keycloak admin user-directory client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::auth::TokenCache;
use crate::config::KeycloakConfig;
use crate::error::{Error, Result};

/// Default timeout applied to every directory request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A user record as returned by the admin users endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Provider-assigned identifier. Read-only from this side.
    pub id: String,
    /// Login name within the realm.
    pub username: String,
}

/// Read access to an identity provider's user directory.
///
/// The lifecycle handler takes this as an injected dependency so tests
/// can substitute a scripted directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolves a username to its provider-assigned identifier.
    ///
    /// When the search matches several records the directory's own
    /// ordering is trusted and the first result wins.
    async fn resolve_user_id(&self, username: &str) -> Result<String>;

    /// Fetches the full user record for a known identifier.
    async fn fetch_user(&self, id: &str) -> Result<UserRecord>;
}

/// HTTP client for the Keycloak admin REST API.
///
/// One instance is shared by every resource handler in the process; the
/// only mutable state is the token cache, so lookups may run fully in
/// parallel.
#[derive(Debug)]
pub struct KeycloakClient {
    config: KeycloakConfig,
    http_client: reqwest::Client,
    token_cache: TokenCache,
}

impl KeycloakClient {
    /// Creates a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: KeycloakConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        let token_cache = TokenCache::new(config.clone(), http_client.clone());

        Ok(Self {
            config,
            http_client,
            token_cache,
        })
    }

    /// The token cache backing this client.
    #[must_use]
    pub fn token_cache(&self) -> &TokenCache {
        &self.token_cache
    }

    /// Eagerly acquires a token, verifying that the credentials and the
    /// token endpoint work. Intended for configure-time probing.
    #[instrument(skip(self), fields(realm = %self.config.realm))]
    pub async fn test_connection(&self) -> Result<()> {
        self.token_cache.get_token().await.map(|_| ())
    }
}

#[async_trait]
impl UserDirectory for KeycloakClient {
    #[instrument(skip(self))]
    async fn resolve_user_id(&self, username: &str) -> Result<String> {
        if username.is_empty() {
            return Err(Error::InvalidArgument(
                "username must not be empty".to_string(),
            ));
        }

        let token = self.token_cache.get_token().await?;

        let response = self
            .http_client
            .get(self.config.users_endpoint())
            .query(&[("username", username)])
            .bearer_auth(&token)
            .send()
            .await?;
        debug!(status = %response.status(), "User search response");

        let users: Vec<UserRecord> = response.json().await?;
        match users.into_iter().next() {
            Some(user) => {
                debug!(user_id = %user.id, "Resolved username");
                Ok(user.id)
            }
            None => Err(Error::UserNotFound(username.to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn fetch_user(&self, id: &str) -> Result<UserRecord> {
        if id.is_empty() {
            return Err(Error::InvalidArgument("user id must not be empty".to_string()));
        }

        let token = self.token_cache.get_token().await?;
        let url = format!("{}/{}", self.config.users_endpoint(), id);

        let response = self.http_client.get(&url).bearer_auth(&token).send().await?;
        debug!(status = %response.status(), "User fetch response");

        // No status inspection here: an error body fails to decode as a
        // user record and surfaces as a decode failure, which callers
        // treat the same as absence.
        let user: UserRecord = response.json().await?;
        Ok(user)
    }
}
