//! The extraction seam.

use async_trait::async_trait;
use tallybook_core::ExtractedData;

use crate::error::ExtractError;

/// What gets sent to the extraction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionInput {
    /// A binary document (PDF or image) forwarded as-is.
    Document {
        /// Raw file bytes.
        bytes: Vec<u8>,
        /// MIME type to declare.
        mime_type: String,
    },
    /// Plain text, e.g. a flattened spreadsheet.
    Text(String),
}

/// Anything that can turn a document into extracted records.
///
/// Calls run to completion or failure; there is no cancellation.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract invoices, products and customers from `input`.
    async fn extract(&self, input: ExtractionInput) -> Result<ExtractedData, ExtractError>;
}
