//! Connector configuration with environment fallback.

use secrecy::SecretString;
use url::Url;

use crate::error::{Error, Result};

/// Environment variable consulted when `url` is not set explicitly.
pub const ENV_URL: &str = "KEYCLOAK_URL";
/// Environment variable consulted when `realm` is not set explicitly.
pub const ENV_REALM: &str = "KEYCLOAK_REALM";
/// Environment variable consulted when `client_id` is not set explicitly.
pub const ENV_CLIENT_ID: &str = "KEYCLOAK_CLIENT_ID";
/// Environment variable consulted when `client_secret` is not set explicitly.
pub const ENV_CLIENT_SECRET: &str = "KEYCLOAK_CLIENT_SECRET";

/// Credentials and endpoint for one Keycloak installation.
///
/// Immutable once constructed; supplied once at configure time and
/// shared by every resource handler in the process.
#[derive(Debug, Clone)]
pub struct KeycloakConfig {
    /// Base URL of the Keycloak server, without a trailing slash.
    pub url: String,
    /// Realm whose user directory is queried.
    pub realm: String,
    /// `OAuth2` client id used for the client-credentials grant.
    pub client_id: String,
    /// `OAuth2` client secret. Redacted in `Debug` output.
    pub client_secret: SecretString,
}

impl KeycloakConfig {
    /// Build a configuration from explicit values only.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is empty or the URL does not parse.
    pub fn new(
        url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            url: url.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into().into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from optional explicit values, falling back
    /// to the `KEYCLOAK_*` environment variables for anything unset.
    /// Explicit values win over the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] naming the first field that is
    /// present in neither source.
    pub fn resolve(
        url: Option<String>,
        realm: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Result<Self> {
        Self::resolve_with(
            |name| std::env::var(name).ok(),
            url,
            realm,
            client_id,
            client_secret,
        )
    }

    /// Like [`KeycloakConfig::resolve`] with an injectable environment
    /// lookup.
    pub fn resolve_with<E>(
        env: E,
        url: Option<String>,
        realm: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let field = |explicit: Option<String>, var: &str, field: &'static str| {
            explicit
                .filter(|v| !v.is_empty())
                .or_else(|| env(var).filter(|v| !v.is_empty()))
                .ok_or(Error::MissingField { field })
        };

        let config = Self {
            url: field(url, ENV_URL, "url")?,
            realm: field(realm, ENV_REALM, "realm")?,
            client_id: field(client_id, ENV_CLIENT_ID, "client_id")?,
            client_secret: field(client_secret, ENV_CLIENT_SECRET, "client_secret")?.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate field presence and that the base URL parses.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first empty field, or the URL parse
    /// failure.
    pub fn validate(&self) -> Result<()> {
        use secrecy::ExposeSecret;

        if self.url.is_empty() {
            return Err(Error::MissingField { field: "url" });
        }
        if self.realm.is_empty() {
            return Err(Error::MissingField { field: "realm" });
        }
        if self.client_id.is_empty() {
            return Err(Error::MissingField { field: "client_id" });
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err(Error::MissingField {
                field: "client_secret",
            });
        }
        Url::parse(&self.url)?;
        Ok(())
    }

    /// Base URL with any trailing slash stripped, for endpoint building.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Token endpoint for the configured realm.
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        format!(
            "{}/auth/realms/{}/protocol/openid-connect/token",
            self.base_url(),
            self.realm
        )
    }

    /// Admin users collection endpoint for the configured realm.
    #[must_use]
    pub fn users_endpoint(&self) -> String {
        format!("{}/auth/admin/realms/{}/users", self.base_url(), self.realm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn explicit_values_validate() {
        let config =
            KeycloakConfig::new("https://kc.example.com", "acme", "terraform", "hunter2").unwrap();
        assert_eq!(config.realm, "acme");
        assert_eq!(
            config.token_endpoint(),
            "https://kc.example.com/auth/realms/acme/protocol/openid-connect/token"
        );
        assert_eq!(
            config.users_endpoint(),
            "https://kc.example.com/auth/admin/realms/acme/users"
        );
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config =
            KeycloakConfig::new("https://kc.example.com/", "acme", "terraform", "hunter2").unwrap();
        assert_eq!(config.base_url(), "https://kc.example.com");
    }

    #[test]
    fn each_missing_field_is_named() {
        for (url, realm, id, secret, expected) in [
            (None, Some("r"), Some("c"), Some("s"), "url"),
            (Some("https://x"), None, Some("c"), Some("s"), "realm"),
            (Some("https://x"), Some("r"), None, Some("s"), "client_id"),
            (Some("https://x"), Some("r"), Some("c"), None, "client_secret"),
        ] {
            let err = KeycloakConfig::resolve_with(
                no_env,
                url.map(String::from),
                realm.map(String::from),
                id.map(String::from),
                secret.map(String::from),
            )
            .unwrap_err();
            match err {
                Error::MissingField { field } => assert_eq!(field, expected),
                other => panic!("expected MissingField, got {other}"),
            }
        }
    }

    #[test]
    fn environment_fills_unset_fields() {
        let env = |name: &str| match name {
            ENV_URL => Some("https://env.example.com".to_string()),
            ENV_CLIENT_SECRET => Some("env-secret".to_string()),
            _ => None,
        };
        let config = KeycloakConfig::resolve_with(
            env,
            None,
            Some("acme".to_string()),
            Some("terraform".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(config.url, "https://env.example.com");
    }

    #[test]
    fn explicit_value_beats_environment() {
        let env = |name: &str| match name {
            ENV_URL => Some("https://env.example.com".to_string()),
            _ => Some("from-env".to_string()),
        };
        let config = KeycloakConfig::resolve_with(
            env,
            Some("https://explicit.example.com".to_string()),
            None,
            None,
            None,
        )
        .unwrap();
        assert_eq!(config.url, "https://explicit.example.com");
        assert_eq!(config.realm, "from-env");
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = KeycloakConfig::new("not a url", "acme", "terraform", "hunter2").unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn debug_redacts_the_secret() {
        let config =
            KeycloakConfig::new("https://kc.example.com", "acme", "terraform", "hunter2").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
