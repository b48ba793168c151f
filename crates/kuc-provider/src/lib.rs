//! User lookup resource lifecycle for an infrastructure-as-code tool.
//!
//! Adapts create/read/update/delete/import semantics onto the read-only
//! Keycloak directory client from [`kuc_connector`]. The provider never
//! creates or deletes accounts upstream: "create" discovers an existing
//! user's identifier (tolerating directory propagation lag with bounded
//! backoff), "delete" merely stops tracking it, and a user that has
//! vanished upstream is dropped from state on read so the orchestrator
//! recreates the binding on the next apply.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use kuc_connector::{KeycloakClient, KeycloakConfig};
//! use kuc_provider::UserResource;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> kuc_connector::Result<()> {
//! let config = KeycloakConfig::resolve(None, None, None, None)?;
//! let client = Arc::new(KeycloakClient::new(config)?);
//! client.test_connection().await?;
//!
//! let resource = UserResource::new(client);
//! let state = resource.create("alice", &CancellationToken::new()).await?;
//! assert!(!state.id.is_empty());
//! # Ok(())
//! # }
//! ```

mod resource;
mod schema;

// Re-exports
pub use resource::{UserResource, UserState};
pub use schema::{
    provider_schema, AttributeSchema, ProviderSchema, ResourceSchema, USER_RESOURCE_TYPE,
};
