//! Error types for tallybook-core.
//!
//! Only the ingestion boundary can fail. Collection and propagation operations degrade
//! to no-ops instead of returning errors.

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors raised while accepting extracted data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// The input's content kind is not one the extractor accepts.
    #[error("unsupported format: {mime_type} ({filename})")]
    UnsupportedFormat {
        /// Declared MIME type.
        mime_type: String,
        /// Original file name.
        filename: String,
    },

    /// The extractor's reply was not a JSON object after fence stripping.
    #[error("failed to parse AI response: {reason}")]
    UnparsableResponse {
        /// The text as received.
        raw: String,
        /// Parser diagnostic.
        reason: String,
    },
}

impl IngestError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::UnparsableResponse { .. } => "unparsable_response",
        }
    }
}
