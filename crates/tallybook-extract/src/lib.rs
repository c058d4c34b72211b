//! Document extraction for tallybook.
//!
//! This crate talks to the external extraction service and feeds its output to the
//! ledger:
//!
//! - [`Extractor`]: the seam; [`GeminiClient`] is the production implementation
//! - [`EXTRACTION_PROMPT`]: the fixed task description sent with every request
//! - [`Importer`]: routes uploads by content kind and imports batches sequentially
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tallybook_core::Ledger;
//! use tallybook_extract::{GeminiClient, Importer, SourceFile};
//!
//! # async fn example() -> Result<(), tallybook_extract::ExtractError> {
//! let client = GeminiClient::new("your-api-key")?;
//! let importer = Importer::new(Some(Arc::new(client)));
//! let mut ledger = Ledger::new();
//!
//! let file = SourceFile {
//!     filename: "invoice.pdf".to_string(),
//!     mime_type: "application/pdf".to_string(),
//!     bytes: std::fs::read("invoice.pdf").unwrap_or_default(),
//! };
//! let outcomes = importer.import_batch(vec![file], |data| ledger.ingest(data)).await;
//! println!("{outcomes:?}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod extractor;
mod importer;
mod prompt;

pub use client::{GeminiClient, GeminiOptions, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::ExtractError;
pub use extractor::{ExtractionInput, Extractor};
pub use importer::{FileOutcome, FileStatus, Importer, SheetFlattener, SourceFile};
pub use prompt::EXTRACTION_PROMPT;
