//! End-to-end lifecycle tests: the real Keycloak client driven through
//! the resource handler against a mock server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kuc_connector::{Error, KeycloakClient, KeycloakConfig, RetryPolicy, UserDirectory};
use kuc_provider::{UserResource, UserState};

const TOKEN_PATH: &str = "/auth/realms/acme/protocol/openid-connect/token";
const USERS_PATH: &str = "/auth/admin/realms/acme/users";

async fn setup(server: &MockServer) -> Arc<KeycloakClient> {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;

    let config = KeycloakConfig::new(server.uri(), "acme", "terraform", "hunter2").unwrap();
    Arc::new(KeycloakClient::new(config).unwrap())
}

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries)
        .with_initial_delay(Duration::from_millis(5))
        .with_max_delay(Duration::from_millis(40))
}

#[tokio::test]
async fn create_persists_resolved_identifier() {
    let server = MockServer::start().await;
    let client = setup(&server).await;

    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .and(query_param("username", "alice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "u-123", "username": "alice"}])),
        )
        .mount(&server)
        .await;

    let resource = UserResource::with_retry(client, fast_retry(2));
    let state = resource
        .create("alice", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(state.username, "alice");
    assert_eq!(state.id, "u-123");
}

#[tokio::test]
async fn create_waits_out_directory_propagation() {
    let server = MockServer::start().await;
    let client = setup(&server).await;

    // The directory lags: two empty search results before the user
    // becomes visible.
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "u-123", "username": "alice"}])),
        )
        .mount(&server)
        .await;

    let resource = UserResource::with_retry(client, fast_retry(4));
    let state = resource
        .create("alice", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(state.id, "u-123");
}

#[tokio::test]
async fn create_gives_up_after_retry_budget() {
    let server = MockServer::start().await;
    let client = setup(&server).await;

    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let resource = UserResource::with_retry(client, fast_retry(2));
    let err = resource
        .create("ghost", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RetriesExhausted { .. }));
    assert!(err.to_string().contains("ghost"));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn read_self_heals_a_renamed_user() {
    let server = MockServer::start().await;
    let client = setup(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{USERS_PATH}/u-123")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-123",
            "username": "alice-renamed"
        })))
        .mount(&server)
        .await;

    let resource = UserResource::new(client);
    let current = UserState {
        username: "alice".to_string(),
        id: "u-123".to_string(),
    };
    let refreshed = resource.read(&current).await.unwrap().unwrap();
    assert_eq!(refreshed.username, "alice-renamed");
}

#[tokio::test]
async fn read_of_deleted_user_drops_state() {
    let server = MockServer::start().await;
    let client = setup(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{USERS_PATH}/u-123")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "User not found"
        })))
        .mount(&server)
        .await;

    let resource = UserResource::new(client);
    let current = UserState {
        username: "alice".to_string(),
        id: "u-123".to_string(),
    };
    assert_eq!(resource.read(&current).await.unwrap(), None);
}

#[tokio::test]
async fn import_then_read_matches_direct_fetch() {
    let server = MockServer::start().await;
    let client = setup(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{USERS_PATH}/u-123")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-123",
            "username": "alice"
        })))
        .mount(&server)
        .await;

    let resource = UserResource::new(client.clone());

    let seeded = resource.import("u-123");
    let read_back = resource.read(&seeded).await.unwrap().unwrap();
    let direct = client.fetch_user("u-123").await.unwrap();

    assert_eq!(read_back.id, direct.id);
    assert_eq!(read_back.username, direct.username);
}

#[tokio::test]
async fn handlers_share_one_client_and_one_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{USERS_PATH}/u-123")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-123",
            "username": "alice"
        })))
        .mount(&server)
        .await;

    let config = KeycloakConfig::new(server.uri(), "acme", "terraform", "hunter2").unwrap();
    let client = Arc::new(KeycloakClient::new(config).unwrap());

    // Several handlers over the same shared client, driven in parallel.
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let resource = UserResource::new(client.clone());
            tokio::spawn(async move {
                let current = UserState {
                    username: "alice".to_string(),
                    id: "u-123".to_string(),
                };
                resource.read(&current).await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_some());
    }
}
