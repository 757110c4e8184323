//! Integration tests for XrayClient/XraySession.
//!
//! Covers the credential exchange, bearer-token usage on the GraphQL
//! endpoint, GraphQL-level error surfacing, and result import.

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xraylink_core::{TestManagement, Verdict};
use xraylink_remote::{RemoteConfig, RemoteError, XrayClient};

fn create_test_client(mock_server: &MockServer) -> XrayClient {
    let config = RemoteConfig::for_tests().with_tm_url(mock_server.uri());
    XrayClient::new(&config).expect("failed to create client")
}

async fn mount_authenticate(mock_server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v2/authenticate"))
        .and(body_json(json!({
            "client_id": "client-id",
            "client_secret": "client-secret",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn authenticate_exchanges_credentials_for_a_token() {
    let mock_server = MockServer::start().await;
    mount_authenticate(&mock_server, "session-token").await;

    Mock::given(method("POST"))
        .and(path("/api/v2/graphql"))
        .and(header("authorization", "Bearer session-token"))
        .and(body_string_contains("addTestsToTestSet"))
        .and(body_string_contains("TS-01"))
        .and(body_string_contains("PROJ-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "addTestsToTestSet": { "warning": null } }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = create_test_client(&mock_server)
        .authenticate()
        .await
        .expect("authentication failed");

    session
        .add_test_to_set("TS-01", "PROJ-5")
        .await
        .expect("mutation failed");
}

#[tokio::test]
async fn rejected_credentials_are_fatal_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/authenticate"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unknown client"))
        .mount(&mock_server)
        .await;

    let err = create_test_client(&mock_server)
        .authenticate()
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::Unauthorized { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn empty_token_is_an_invalid_response() {
    let mock_server = MockServer::start().await;
    mount_authenticate(&mock_server, "").await;

    let err = create_test_client(&mock_server)
        .authenticate()
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::InvalidResponse { .. }));
}

#[tokio::test]
async fn add_to_execution_uses_the_execution_mutation() {
    let mock_server = MockServer::start().await;
    mount_authenticate(&mock_server, "session-token").await;

    Mock::given(method("POST"))
        .and(path("/api/v2/graphql"))
        .and(body_string_contains("addTestsToTestExecution"))
        .and(body_string_contains("TE-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "addTestsToTestExecution": { "warning": null } }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = create_test_client(&mock_server)
        .authenticate()
        .await
        .expect("authentication failed");

    session
        .add_test_to_execution("TE-01", "PROJ-5")
        .await
        .expect("mutation failed");
}

#[tokio::test]
async fn graphql_errors_fail_the_call() {
    let mock_server = MockServer::start().await;
    mount_authenticate(&mock_server, "session-token").await;

    Mock::given(method("POST"))
        .and(path("/api/v2/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "Test Set TS-01 does not exist" }]
        })))
        .mount(&mock_server)
        .await;

    let session = create_test_client(&mock_server)
        .authenticate()
        .await
        .expect("authentication failed");

    let err = session
        .add_test_to_set("TS-01", "PROJ-5")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[tokio::test]
async fn import_posts_the_execution_result() {
    let mock_server = MockServer::start().await;
    mount_authenticate(&mock_server, "session-token").await;

    Mock::given(method("POST"))
        .and(path("/api/v2/import/execution"))
        .and(header("authorization", "Bearer session-token"))
        .and(body_json(json!({
            "testExecutionKey": "TE-01",
            "tests": [{
                "testKey": "PROJ-5",
                "status": "FAILED",
                "comment": "body has items: expected items",
            }],
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "42", "key": "TE-01" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = create_test_client(&mock_server)
        .authenticate()
        .await
        .expect("authentication failed");

    session
        .import_result(
            "TE-01",
            "PROJ-5",
            Verdict::Failed,
            Some("body has items: expected items"),
        )
        .await
        .expect("import failed");
}

#[tokio::test]
async fn import_failure_carries_status_and_body() {
    let mock_server = MockServer::start().await;
    mount_authenticate(&mock_server, "session-token").await;

    Mock::given(method("POST"))
        .and(path("/api/v2/import/execution"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown test execution"))
        .mount(&mock_server)
        .await;

    let session = create_test_client(&mock_server)
        .authenticate()
        .await
        .expect("authentication failed");

    let err = session
        .import_result("TE-99", "PROJ-5", Verdict::Passed, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("HTTP 400"));
}
