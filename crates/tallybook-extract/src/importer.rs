//! Routing uploaded files to the extractor and importing batches.
//!
//! Files in a batch are processed strictly one after another: each file's extraction
//! and merge complete before the next file starts. A failing file is reported in its
//! [`FileOutcome`] and the batch carries on.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tallybook_core::{ContentKind, ExtractedData, IngestSummary};
use tracing::{info, instrument, warn};

use crate::error::ExtractError;
use crate::extractor::{ExtractionInput, Extractor};

/// Turns a spreadsheet workbook into plain text the extractor can read.
pub trait SheetFlattener: Send + Sync {
    /// Flatten `bytes` to text.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the workbook cannot be read.
    fn flatten(&self, bytes: &[u8], kind: ContentKind) -> Result<String, String>;
}

/// One uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Original file name.
    pub filename: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Result of importing one file of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    /// The file this outcome belongs to.
    pub filename: String,
    /// What happened.
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Success or failure of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Records were merged into the ledger.
    Imported {
        /// Counts of merged records.
        summary: IngestSummary,
    },
    /// Nothing was merged for this file.
    Failed {
        /// Machine-readable error code.
        code: String,
        /// Error message.
        message: String,
    },
}

impl FileOutcome {
    /// Whether the file was imported.
    #[must_use]
    pub fn is_imported(&self) -> bool {
        matches!(self.status, FileStatus::Imported { .. })
    }
}

/// Routes files by content kind and feeds them to an [`Extractor`].
#[derive(Clone, Default)]
pub struct Importer {
    extractor: Option<Arc<dyn Extractor>>,
    flattener: Option<Arc<dyn SheetFlattener>>,
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("extractor", &self.extractor.is_some())
            .field("flattener", &self.flattener.is_some())
            .finish()
    }
}

impl Importer {
    /// Create an importer. `None` means extraction is not configured.
    #[must_use]
    pub fn new(extractor: Option<Arc<dyn Extractor>>) -> Self {
        Self {
            extractor,
            flattener: None,
        }
    }

    /// Install a spreadsheet parser.
    #[must_use]
    pub fn with_flattener(mut self, flattener: Arc<dyn SheetFlattener>) -> Self {
        self.flattener = Some(flattener);
        self
    }

    /// Whether an extractor is configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.extractor.is_some()
    }

    /// Build the extractor input for `file`.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported content kinds and for spreadsheets when no
    /// flattener is installed or it cannot read the workbook.
    pub fn prepare(&self, file: &SourceFile) -> Result<ExtractionInput, ExtractError> {
        let kind = ContentKind::detect(&file.mime_type, &file.filename)?;

        if kind.is_inline_document() {
            return Ok(ExtractionInput::Document {
                bytes: file.bytes.clone(),
                mime_type: kind.forwarded_mime(&file.mime_type),
            });
        }

        if kind.needs_flattening() {
            let flattener = self
                .flattener
                .as_ref()
                .ok_or_else(|| ExtractError::ParserUnavailable {
                    filename: file.filename.clone(),
                })?;
            let text = flattener.flatten(&file.bytes, kind).map_err(|reason| {
                warn!(filename = %file.filename, %reason, "spreadsheet could not be flattened");
                ExtractError::ParserUnavailable {
                    filename: file.filename.clone(),
                }
            })?;
            return Ok(ExtractionInput::Text(text));
        }

        Ok(ExtractionInput::Text(
            String::from_utf8_lossy(&file.bytes).into_owned(),
        ))
    }

    /// Extract one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unsupported, extraction is not configured, or the
    /// extractor fails.
    #[instrument(skip(self, file), fields(filename = %file.filename, bytes = file.bytes.len()))]
    pub async fn extract_file(&self, file: &SourceFile) -> Result<ExtractedData, ExtractError> {
        let input = self.prepare(file)?;
        let extractor = self.extractor.as_ref().ok_or(ExtractError::Unavailable)?;
        extractor.extract(input).await
    }

    /// Extract one file and hand the result to `merge`.
    ///
    /// # Errors
    ///
    /// Returns the extraction error; `merge` is not called in that case.
    pub async fn import_file<F>(
        &self,
        file: &SourceFile,
        merge: F,
    ) -> Result<IngestSummary, ExtractError>
    where
        F: FnOnce(ExtractedData) -> IngestSummary,
    {
        let data = self.extract_file(file).await?;
        Ok(merge(data))
    }

    /// Import `files` one at a time, merging each before the next begins.
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn import_batch<F>(&self, files: Vec<SourceFile>, mut merge: F) -> Vec<FileOutcome>
    where
        F: FnMut(ExtractedData) -> IngestSummary,
    {
        let mut outcomes = Vec::with_capacity(files.len());

        for file in files {
            let status = match self.import_file(&file, &mut merge).await {
                Ok(summary) => FileStatus::Imported { summary },
                Err(err) => {
                    warn!(filename = %file.filename, code = err.code(), error = %err, "file import failed");
                    FileStatus::Failed {
                        code: err.code().to_string(),
                        message: err.to_string(),
                    }
                }
            };
            outcomes.push(FileOutcome {
                filename: file.filename,
                status,
            });
        }

        let imported = outcomes.iter().filter(|o| o.is_imported()).count();
        info!(imported, failed = outcomes.len() - imported, "batch import finished");
        outcomes
    }
}
