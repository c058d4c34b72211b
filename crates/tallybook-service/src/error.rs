//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tallybook_core::{IdError, IngestError};
use tallybook_extract::ExtractError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The uploaded file is not a supported document kind.
    #[error("{0}")]
    UnsupportedFormat(String),

    /// A spreadsheet arrived but no parser is installed.
    #[error("{0}")]
    ParserUnavailable(String),

    /// The extraction service is not configured.
    #[error("extraction service is not configured")]
    ExtractionUnavailable,

    /// The extraction service replied with something that is not JSON.
    #[error("unparsable extraction response: {reason}")]
    UnparsableResponse {
        /// Parser error.
        reason: String,
        /// The reply as received.
        raw: String,
    },

    /// The extraction service call failed.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::UnsupportedFormat(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_format",
                self.to_string(),
                None,
            ),
            Self::ParserUnavailable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "parser_unavailable",
                msg.clone(),
                None,
            ),
            Self::ExtractionUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "extraction_unavailable",
                self.to_string(),
                None,
            ),
            Self::UnparsableResponse { raw, .. } => (
                StatusCode::BAD_GATEWAY,
                "unparsable_response",
                self.to_string(),
                Some(serde_json::json!({ "raw": raw })),
            ),
            Self::ExtractionFailed(msg) => (
                StatusCode::BAD_GATEWAY,
                "extraction_failed",
                msg.clone(),
                None,
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Unavailable => Self::ExtractionUnavailable,
            ExtractError::ParserUnavailable { .. } => Self::ParserUnavailable(err.to_string()),
            ExtractError::Ingest(IngestError::UnsupportedFormat { .. }) => {
                Self::UnsupportedFormat(err.to_string())
            }
            ExtractError::Ingest(IngestError::UnparsableResponse { raw, reason }) => {
                Self::UnparsableResponse { reason, raw }
            }
            ExtractError::Http(_) | ExtractError::Api { .. } | ExtractError::EmptyResponse => {
                Self::ExtractionFailed(err.to_string())
            }
            ExtractError::Configuration(msg) => Self::Internal(msg),
        }
    }
}

impl From<IdError> for ApiError {
    fn from(err: IdError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
