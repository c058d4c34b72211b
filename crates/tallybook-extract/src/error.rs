//! Extraction error types.

use tallybook_core::IngestError;

/// Errors that can occur while turning one file into extracted data.
///
/// Every variant is scoped to a single file; a batch carries on past any of them.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// No extraction service is configured.
    #[error("extraction service is not configured")]
    Unavailable,

    /// A spreadsheet arrived but no parser is installed to flatten it.
    #[error("no spreadsheet parser available for {filename}")]
    ParserUnavailable {
        /// The offending file.
        filename: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The extraction service answered with an error status.
    #[error("extraction API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the service, or the status line.
        message: String,
    },

    /// The extraction service answered without any text.
    #[error("extraction service returned no content")]
    EmptyResponse,

    /// The file or the reply was rejected at the ingestion boundary.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// The HTTP client could not be built.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ExtractError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable => "extraction_unavailable",
            Self::ParserUnavailable { .. } => "parser_unavailable",
            Self::Http(_) | Self::Api { .. } | Self::EmptyResponse => "extraction_failed",
            Self::Ingest(inner) => inner.code(),
            Self::Configuration(_) => "configuration_error",
        }
    }
}
