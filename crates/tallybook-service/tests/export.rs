//! CSV export integration tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn invoices_export_every_line() {
    let harness = TestHarness::new();
    harness.seed().await;

    let response = harness.server.get("/v1/export/invoices").await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        "attachment; filename=\"invoices.csv\""
    );

    let text = response.text();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(
        lines[0],
        "serialNumber,customerName,productName,quantity,tax,totalAmount,date"
    );
    assert_eq!(lines[1], "S1,Bob,Pen,2,1.00,10.00,2024-01-01");
    assert_eq!(lines[2], "S1,Bob,Cup,1,0.50,5.00,2024-01-01");
    assert_eq!(lines.len(), 4);
}

#[tokio::test]
async fn selected_group_exports_all_its_lines() {
    let harness = TestHarness::new();
    harness.seed().await;
    let group = harness.group("S1").await;

    let text = harness
        .server
        .get("/v1/export/invoices")
        .add_query_param("ids", group["id"].as_str().unwrap())
        .await
        .text();

    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1..].iter().all(|l| l.starts_with("S1,")));
}

#[tokio::test]
async fn customers_export_uses_two_decimals() {
    let harness = TestHarness::new();
    harness.seed().await;

    let text = harness.server.get("/v1/export/customers").await.text();

    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "name,phoneNumber,totalPurchaseAmount,email,address");
    assert_eq!(lines[1], "Bob,555-0100,15.00,,");
}

#[tokio::test]
async fn product_selection_ignores_unknown_ids() {
    let harness = TestHarness::new();
    harness.seed().await;
    let products = harness.products().await;
    let cup = TestHarness::named(&products, "Cup")["id"].as_str().unwrap().to_string();

    let text = harness
        .server
        .get("/v1/export/products")
        .add_query_param("ids", format!("{cup},prod-missing"))
        .await
        .text();

    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("Cup,1,4.50,0.50,5.00"));
}

#[tokio::test]
async fn unknown_kind_is_bad_request() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/export/orders").await;

    response.assert_status_bad_request();
}
