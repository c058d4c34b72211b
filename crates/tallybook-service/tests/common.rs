//! Common test utilities for tallybook integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use tallybook_core::{parse_response, ExtractedData};
use tallybook_extract::{ExtractError, ExtractionInput, Extractor, Importer};
use tallybook_service::{create_router, AppState, ServiceConfig};
use tallybook_store::{FileSnapshotStore, SnapshotStore};

/// Reply the stub gives for binary documents (PDFs, images).
pub const DOCUMENT_REPLY: &str = r#"```json
{"invoices": [{"serialNumber": "P1", "customerName": "Dana", "productName": "Lamp",
  "quantity": 1, "tax": 3, "totalAmount": 33, "date": "2024-03-01"}],
 "products": [], "customers": []}
```"#;

/// Extractor that answers text inputs with the text itself, so a "CSV" upload can
/// carry the exact reply a test wants.
#[derive(Default)]
pub struct StubExtractor {
    /// Number of extraction calls made.
    pub calls: AtomicUsize,
}

impl StubExtractor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    async fn extract(&self, input: ExtractionInput) -> Result<ExtractedData, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = match input {
            ExtractionInput::Text(text) => text,
            ExtractionInput::Document { .. } => DOCUMENT_REPLY.to_string(),
        };
        Ok(parse_response(&reply)?)
    }
}

/// The standard fixture: two grouped invoices, three products, two customers.
pub fn sample_payload() -> Value {
    json!({
        "invoices": [
            {"serialNumber": "S1", "customerName": "Bob", "productName": "Pen",
             "quantity": 2, "tax": 1, "totalAmount": 10, "date": "2024-01-01"},
            {"serialNumber": "S1", "customerName": "Bob", "productName": "Cup",
             "quantity": 1, "tax": 0.5, "totalAmount": 5, "date": "2024-01-01"},
            {"serialNumber": "S2", "customerName": "Carol", "productName": "Widget",
             "quantity": 4, "tax": 2, "totalAmount": 20, "date": "2024-02-01"}
        ],
        "products": [
            {"name": "Pen", "quantity": 2, "unitPrice": 4.5, "tax": 1, "priceWithTax": 10},
            {"name": "Cup", "quantity": 1, "unitPrice": 4.5, "tax": 0.5, "priceWithTax": 5},
            {"name": "Widget", "quantity": 4, "unitPrice": 4.5, "tax": 2, "priceWithTax": 20}
        ],
        "customers": [
            {"name": "Bob", "phoneNumber": "555-0100", "totalPurchaseAmount": 15},
            {"name": "Carol", "phoneNumber": "555-0101", "totalPurchaseAmount": 20}
        ]
    })
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for snapshots (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// The stub extractor, when extraction is enabled.
    pub extractor: Option<Arc<StubExtractor>>,
    /// Snapshot file, when persistence is enabled.
    pub snapshot_path: Option<PathBuf>,
}

impl TestHarness {
    /// In-memory service with the stub extractor.
    pub fn new() -> Self {
        Self::build(TempDir::new().expect("Failed to create temp directory"), true, false)
    }

    /// In-memory service with no extractor configured.
    pub fn without_extraction() -> Self {
        Self::build(TempDir::new().expect("Failed to create temp directory"), false, false)
    }

    /// Service persisting snapshots into the harness's temp directory.
    pub fn persistent() -> Self {
        Self::build(TempDir::new().expect("Failed to create temp directory"), true, true)
    }

    /// Start a fresh service over the same snapshot file.
    pub fn restart(self) -> Self {
        let persistent = self.snapshot_path.is_some();
        Self::build(self._temp_dir, true, persistent)
    }

    fn build(temp_dir: TempDir, extraction: bool, persistent: bool) -> Self {
        let snapshot_path = persistent.then(|| temp_dir.path().join("ledger.cbor"));

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            snapshot_path: snapshot_path
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            cors_origins: vec!["*".into()],
            ..ServiceConfig::default()
        };

        let extractor = extraction.then(|| Arc::new(StubExtractor::default()));
        let importer = Importer::new(
            extractor
                .clone()
                .map(|e| e as Arc<dyn Extractor>),
        );
        let store = snapshot_path
            .as_ref()
            .map(|p| Arc::new(FileSnapshotStore::new(p)) as Arc<dyn SnapshotStore>);

        let state = AppState::new(config, importer, store);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            extractor,
            snapshot_path,
        }
    }

    /// Import `payload` through the document endpoint as a CSV upload.
    pub async fn import(&self, payload: &Value) {
        self.server
            .post("/v1/documents")
            .add_query_param("filename", "seed.csv")
            .text(payload.to_string())
            .content_type("text/csv")
            .await
            .assert_status_ok();
    }

    /// Import the standard fixture.
    pub async fn seed(&self) {
        self.import(&sample_payload()).await;
    }

    /// Grouped invoices in default order.
    pub async fn groups(&self) -> Vec<Value> {
        self.server.get("/v1/invoices").await.json()
    }

    /// The grouped invoice with the given serial number.
    pub async fn group(&self, serial: &str) -> Value {
        self.groups()
            .await
            .into_iter()
            .find(|g| g["serialNumber"] == serial)
            .expect("group not found")
    }

    /// Flat invoice lines in collection order.
    pub async fn flat_invoices(&self) -> Vec<Value> {
        self.server.get("/v1/invoices/flat").await.json()
    }

    /// Products in default order.
    pub async fn products(&self) -> Vec<Value> {
        self.server.get("/v1/products").await.json()
    }

    /// Customers in default order.
    pub async fn customers(&self) -> Vec<Value> {
        self.server.get("/v1/customers").await.json()
    }

    /// The first record of `records` whose `name` is `name`.
    pub fn named<'a>(records: &'a [Value], name: &str) -> &'a Value {
        records
            .iter()
            .find(|r| r["name"] == name)
            .expect("record not found")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
