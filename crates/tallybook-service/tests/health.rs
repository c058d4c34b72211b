//! Health endpoint integration tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn health_check_returns_ok() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn health_check_reports_configuration() {
    let harness = TestHarness::new();

    let body: serde_json::Value = harness.server.get("/health").await.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "tallybook");
    assert_eq!(body["extraction"], true);
    assert_eq!(body["persistence"], false);
}

#[tokio::test]
async fn health_check_without_extraction() {
    let harness = TestHarness::without_extraction();

    let body: serde_json::Value = harness.server.get("/health").await.json();
    assert_eq!(body["extraction"], false);
}
