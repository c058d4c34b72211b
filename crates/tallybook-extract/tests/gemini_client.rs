//! Gemini client tests against a mock server.

use serde_json::json;
use tallybook_core::IngestError;
use tallybook_extract::{
    ExtractError, ExtractionInput, Extractor, GeminiClient, GeminiOptions, DEFAULT_MODEL,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::with_options(
        "test-key",
        GeminiOptions {
            base_url: server.uri(),
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: 5,
        },
    )
    .unwrap()
}

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn pdf() -> ExtractionInput {
    ExtractionInput::Document {
        bytes: b"%PDF-1.7".to_vec(),
        mime_type: "application/pdf".to_string(),
    }
}

// ============================================================================
// Success
// ============================================================================

#[tokio::test]
async fn fenced_reply_is_parsed() {
    let server = MockServer::start().await;
    let body = "```json\n{\"invoices\":[{\"serialNumber\":\"S1\",\"customerName\":\"Bob\",\"productName\":\"Pen\",\"quantity\":2,\"tax\":1,\"totalAmount\":10,\"date\":\"2024-01-01\"}],\"products\":[],\"customers\":[]}\n```";

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{}, { "inline_data": { "mime_type": "application/pdf" } }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(body)))
        .expect(1)
        .mount(&server)
        .await;

    let data = client(&server).extract(pdf()).await.unwrap();

    assert_eq!(data.invoices.len(), 1);
    assert_eq!(data.invoices[0].serial_number, "S1");
    assert!(data.products.is_empty());
}

#[tokio::test]
async fn text_input_is_sent_as_document_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{}, { "text": "\n\nDocument Content:\nserial,total\nS1,10" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("{}")))
        .expect(1)
        .mount(&server)
        .await;

    let data = client(&server)
        .extract(ExtractionInput::Text("serial,total\nS1,10".to_string()))
        .await
        .unwrap();

    assert!(data.is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn error_status_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let err = client(&server).extract(pdf()).await.unwrap_err();

    match err {
        ExtractError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn error_without_json_body_uses_status_line() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = client(&server).extract(pdf()).await.unwrap_err();

    assert!(matches!(err, ExtractError::Api { status: 503, .. }));
    assert_eq!(err.code(), "extraction_failed");
}

#[tokio::test]
async fn reply_without_candidates_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = client(&server).extract(pdf()).await.unwrap_err();

    assert!(matches!(err, ExtractError::EmptyResponse));
}

#[tokio::test]
async fn prose_reply_is_unparsable_and_keeps_raw_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply("I could not find any invoice.")),
        )
        .mount(&server)
        .await;

    let err = client(&server).extract(pdf()).await.unwrap_err();

    match err {
        ExtractError::Ingest(IngestError::UnparsableResponse { raw, .. }) => {
            assert_eq!(raw, "I could not find any invoice.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
