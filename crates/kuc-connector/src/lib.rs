//! Read-only Keycloak user-directory connector.
//!
//! This crate owns all HTTP interaction with a Keycloak installation's
//! admin REST API: it authenticates with an `OAuth2` client-credentials
//! grant, caches the resulting bearer token for the life of the
//! process, and resolves usernames to the stable identifiers Keycloak
//! assigns them.
//!
//! # Example
//!
//! ```no_run
//! use kuc_connector::{KeycloakClient, KeycloakConfig, UserDirectory};
//!
//! # async fn example() -> kuc_connector::Result<()> {
//! let config = KeycloakConfig::resolve(
//!     Some("https://kc.example.com".to_string()),
//!     Some("acme".to_string()),
//!     Some("terraform".to_string()),
//!     Some("client-secret".to_string()),
//! )?;
//!
//! let client = KeycloakClient::new(config)?;
//! client.test_connection().await?;
//!
//! let id = client.resolve_user_id("alice").await?;
//! let user = client.fetch_user(&id).await?;
//! assert_eq!(user.username, "alice");
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod error;
mod retry;

// Re-exports
pub use auth::TokenCache;
pub use client::{KeycloakClient, UserDirectory, UserRecord};
pub use config::{
    KeycloakConfig, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_REALM, ENV_URL,
};
pub use error::{Error, Result};
pub use retry::RetryPolicy;
