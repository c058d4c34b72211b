//! Gemini `generateContent` client.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tallybook_core::{parse_response, ExtractedData};
use tracing::{debug, instrument, warn};

use crate::error::ExtractError;
use crate::extractor::{ExtractionInput, Extractor};
use crate::prompt::EXTRACTION_PROMPT;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Request timeout in seconds (default: 120).
    pub timeout_seconds: u64,
}

impl Default for GeminiOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: 120,
        }
    }
}

impl GeminiClient {
    /// Create a client with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ExtractError> {
        Self::with_options(api_key, GeminiOptions::default())
    }

    /// Create a client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(
        api_key: impl Into<String>,
        options: GeminiOptions,
    ) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ExtractError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: options.model,
        })
    }

    /// The model requests are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the prompt plus `input` and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service answers with an error status,
    /// or the reply holds no text.
    #[instrument(skip(self, input), fields(model = %self.model))]
    pub async fn generate(&self, input: &ExtractionInput) -> Result<String, ExtractError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateRequest::new(input);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let reply: GenerateResponse = self.handle_response(response).await?;
        let text = reply.text().ok_or(ExtractError::EmptyResponse)?;
        debug!(chars = text.len(), "received extraction reply");
        Ok(text)
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ExtractError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<ApiErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("HTTP {status}"),
        };
        warn!(status = status.as_u16(), %message, "extraction request rejected");
        Err(ExtractError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Extractor for GeminiClient {
    async fn extract(&self, input: ExtractionInput) -> Result<ExtractedData, ExtractError> {
        let text = self.generate(&input).await?;
        Ok(parse_response(&text)?)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

impl GenerateRequest {
    fn new(input: &ExtractionInput) -> Self {
        let document = match input {
            ExtractionInput::Document { bytes, mime_type } => Part::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: STANDARD.encode(bytes),
                },
            },
            ExtractionInput::Text(text) => Part::Text {
                text: format!("\n\nDocument Content:\n{text}"),
            },
        };
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    },
                    document,
                ],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_trims_trailing_slash() {
        let options = GeminiOptions {
            base_url: "http://localhost:9000/".into(),
            ..GeminiOptions::default()
        };
        let client = GeminiClient::with_options("key", options).unwrap();
        assert_eq!(client.base_url, "http://localhost:9000");
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn document_request_carries_prompt_and_inline_data() {
        let request = GenerateRequest::new(&ExtractionInput::Document {
            bytes: b"%PDF".to_vec(),
            mime_type: "application/pdf".into(),
        });
        let value = serde_json::to_value(&request).unwrap();
        let parts = &value["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], json!(EXTRACTION_PROMPT));
        assert_eq!(parts[1]["inline_data"]["mime_type"], json!("application/pdf"));
        assert_eq!(parts[1]["inline_data"]["data"], json!("JVBERg=="));
    }

    #[test]
    fn text_request_appends_document_content() {
        let request = GenerateRequest::new(&ExtractionInput::Text("a,b\n1,2".into()));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["contents"][0]["parts"][1]["text"],
            json!("\n\nDocument Content:\na,b\n1,2")
        );
    }

    #[test]
    fn reply_text_joins_parts_of_first_candidate() {
        let reply: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"invoices\":"}, {"text": "[]}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(reply.text().as_deref(), Some("{\"invoices\":[]}"));
    }

    #[test]
    fn reply_without_candidates_has_no_text() {
        let reply: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(reply.text(), None);
    }
}
