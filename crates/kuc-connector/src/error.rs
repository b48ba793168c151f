//! Error types for the Keycloak directory connector.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when interacting with the Keycloak admin API.
#[derive(Debug, Error)]
pub enum Error {
    /// A required configuration field is absent from both the explicit
    /// configuration and the environment.
    #[error("Configuration error: missing required field `{field}`")]
    MissingField { field: &'static str },

    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation was given an unusable argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `OAuth2` token acquisition error. The token cache is left empty
    /// so a later call can retry.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// HTTP transport or body-decoding error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The directory has no user matching the given username or id.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The caller cancelled the operation; remaining retries were
    /// abandoned.
    #[error("Operation cancelled")]
    Cancelled,

    /// The retry budget ran out before the directory returned a match.
    #[error("User {username} not found after {attempts} attempts: {source}")]
    RetriesExhausted {
        username: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// True for the not-found family, including retry exhaustion that
    /// ended on a missing user.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::UserNotFound(_) => true,
            Error::RetriesExhausted { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
