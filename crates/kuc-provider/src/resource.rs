//! Lifecycle handling for the `kuc_user` resource.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use kuc_connector::{Error, Result, RetryPolicy, UserDirectory};

/// Managed state for a single user resource, as persisted by the
/// orchestrator.
///
/// `id` is assigned by Keycloak and stays stable across plan cycles
/// unless the resource is destroyed and recreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    /// Login name within the realm. User-supplied.
    pub username: String,
    /// Provider-assigned identifier. Computed.
    pub id: String,
}

/// Retry budget for create-time lookups: the directory may lag behind
/// account provisioning elsewhere, so absence right after creation is
/// expected and waited out.
fn default_create_retry() -> RetryPolicy {
    RetryPolicy::new(5)
        .with_initial_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(30))
}

/// Lifecycle handler for user lookup resources.
///
/// One shared directory client serves every resource instance the
/// orchestrator creates in a process; handlers are cheap to clone and
/// safe to drive concurrently.
pub struct UserResource<D: UserDirectory + ?Sized> {
    directory: Arc<D>,
    retry: RetryPolicy,
}

impl<D: UserDirectory + ?Sized> Clone for UserResource<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            retry: self.retry.clone(),
        }
    }
}

impl<D: UserDirectory + ?Sized> UserResource<D> {
    /// Creates a handler over the shared directory client with the
    /// default create-time retry budget.
    pub fn new(directory: Arc<D>) -> Self {
        Self::with_retry(directory, default_create_retry())
    }

    /// Creates a handler with an explicit retry policy.
    pub fn with_retry(directory: Arc<D>, retry: RetryPolicy) -> Self {
        Self { directory, retry }
    }

    /// Resolves the desired username to its identifier and returns the
    /// state to persist.
    ///
    /// Every lookup failure, including "not found", is retried with
    /// exponentially increasing delay until the policy's budget runs
    /// out; cancellation of `cancel` aborts any pending retries.
    ///
    /// # Errors
    ///
    /// [`Error::RetriesExhausted`] naming the username and the last
    /// underlying error once the budget is spent, or
    /// [`Error::Cancelled`]. Nothing is persisted on failure.
    #[instrument(skip(self, cancel))]
    pub async fn create(&self, username: &str, cancel: &CancellationToken) -> Result<UserState> {
        let attempts = self.retry.max_attempts();
        let id = self
            .retry
            .execute(cancel, || self.directory.resolve_user_id(username))
            .await
            .map_err(|e| match e {
                Error::Cancelled => Error::Cancelled,
                source => Error::RetriesExhausted {
                    username: username.to_string(),
                    attempts,
                    source: Box::new(source),
                },
            })?;

        debug!(%id, "Resolved user for new resource");
        Ok(UserState {
            username: username.to_string(),
            id,
        })
    }

    /// Refreshes state from the directory, exactly once, no retry.
    ///
    /// `Ok(Some(state))` carries the freshly fetched record, picking up
    /// upstream renames. `Ok(None)` means the user is no longer
    /// readable and the resource must be dropped from state so the next
    /// apply recreates it; a fetch failure is drift, not an error.
    #[instrument(skip(self), fields(id = %current.id))]
    pub async fn read(&self, current: &UserState) -> Result<Option<UserState>> {
        match self.directory.fetch_user(&current.id).await {
            Ok(user) => Ok(Some(UserState {
                username: user.username,
                id: user.id,
            })),
            Err(e) => {
                warn!(error = %e, "User no longer readable, removing from state");
                Ok(None)
            }
        }
    }

    /// Persists the planned state verbatim. The directory offers no
    /// in-place mutation for these fields; a username change is handled
    /// upstream as destroy-and-recreate.
    #[must_use]
    pub fn update(&self, planned: UserState) -> UserState {
        planned
    }

    /// Stops tracking the resource. The upstream account is never
    /// deleted from here.
    pub fn delete(&self, current: &UserState) {
        debug!(id = %current.id, "Dropping user from managed state");
    }

    /// Seeds state from an externally supplied identifier. A following
    /// [`UserResource::read`] fills in the username.
    #[must_use]
    pub fn import(&self, id: &str) -> UserState {
        UserState {
            username: String::new(),
            id: id.to_string(),
        }
    }
}
