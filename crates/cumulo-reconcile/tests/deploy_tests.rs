//! Integration tests for the deploy-completion waiter — status
//! classification, newest-deploy selection, and the empty-history case.

use cumulo_client::{ApiClient, ClientConfig, RateLimiter, RetryPolicy};
use cumulo_reconcile::{PollConfig, Reconciler, ReconcileError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reconciler(server: &MockServer) -> Reconciler {
    let client = ApiClient::new(
        &ClientConfig::new(server.uri(), "test-key"),
        Arc::new(RateLimiter::disabled()),
    )
    .unwrap()
    .with_retry_policy(RetryPolicy::no_wait());
    Reconciler::new(client).with_poll_config(PollConfig::no_wait())
}

fn deploy_json(id: &str, status: &str, created_at: &str) -> serde_json::Value {
    json!({ "id": id, "status": status, "createdAt": created_at })
}

const TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::test]
async fn test_wait_returns_once_the_deploy_goes_live() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/srv-1/deploys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            deploy_json("dep-1", "update_in_progress", "2025-06-01T12:00:00Z")
        ])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/srv-1/deploys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            deploy_json("dep-1", "live", "2025-06-01T12:00:00Z")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    reconciler(&server)
        .wait_for_live("srv-1", TIMEOUT)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_terminal_failure_stops_the_wait_with_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/srv-1/deploys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            deploy_json("dep-1", "build_failed", "2025-06-01T12:00:00Z")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let err = reconciler(&server)
        .wait_for_live("srv-1", TIMEOUT)
        .await
        .unwrap_err();
    match err {
        ReconcileError::DeployFailed { deploy_id, status } => {
            assert_eq!(deploy_id, "dep-1");
            assert_eq!(status, "build_failed");
        }
        other => panic!("expected DeployFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_the_most_recently_created_deploy_decides_the_outcome() {
    let server = MockServer::start().await;

    // An old live deploy must not mask the newest one having failed.
    Mock::given(method("GET"))
        .and(path("/services/srv-1/deploys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            deploy_json("dep-old", "live", "2025-06-01T10:00:00Z"),
            deploy_json("dep-new", "canceled", "2025-06-01T12:00:00Z"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let err = reconciler(&server)
        .wait_for_live("srv-1", TIMEOUT)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReconcileError::DeployFailed { ref deploy_id, .. } if deploy_id == "dep-new"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_empty_history_means_not_started_yet() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/srv-1/deploys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/srv-1/deploys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            deploy_json("dep-1", "live", "2025-06-01T12:00:00Z")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    reconciler(&server)
        .wait_for_live("srv-1", TIMEOUT)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_deadline_expiry_is_a_timeout_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/srv-1/deploys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let err = reconciler(&server)
        .wait_for_live("srv-1", Duration::ZERO)
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "got: {err:?}");
}

#[tokio::test]
async fn test_probe_error_propagates_and_stops_polling() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/srv-1/deploys"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = reconciler(&server)
        .wait_for_live("srv-1", TIMEOUT)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            ReconcileError::Api(cumulo_client::ApiError::Server { status: 500 })
        ),
        "got: {err:?}"
    );
}
