//! Whole-ledger and persistence integration tests.

mod common;

use common::TestHarness;
use serde_json::{json, Value};

#[tokio::test]
async fn summary_counts_lines_and_groups() {
    let harness = TestHarness::new();
    harness.seed().await;

    let body: Value = harness.server.get("/v1/ledger").await.json();
    assert_eq!(
        body,
        json!({"invoiceLines": 3, "invoices": 2, "products": 3, "customers": 2})
    );
}

#[tokio::test]
async fn clear_empties_every_collection() {
    let harness = TestHarness::new();
    harness.seed().await;

    let response = harness.server.delete("/v1/ledger").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["invoiceLines"], 0);
    assert!(harness.groups().await.is_empty());
    assert!(harness.products().await.is_empty());
    assert!(harness.customers().await.is_empty());
}

#[tokio::test]
async fn ledger_survives_restart_when_persistent() {
    let harness = TestHarness::persistent();
    harness.seed().await;
    let group = harness.group("S1").await;
    harness
        .server
        .put(&format!("/v1/invoices/groups/{}", group["id"].as_str().unwrap()))
        .json(&json!({ "customerName": "Alice" }))
        .await
        .assert_status_ok();

    assert!(harness.snapshot_path.as_ref().unwrap().exists());
    let harness = harness.restart();

    let restored = harness.group("S1").await;
    assert_eq!(restored["id"], group["id"]);
    assert_eq!(restored["customerName"], "Alice");
    assert_eq!(harness.customers().await.len(), 2);
}

#[tokio::test]
async fn in_memory_ledger_starts_empty() {
    let harness = TestHarness::new();

    let body: Value = harness.server.get("/v1/ledger").await.json();
    assert_eq!(body["invoiceLines"], 0);
    assert!(harness.snapshot_path.is_none());
}
