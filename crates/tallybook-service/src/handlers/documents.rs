//! Document upload handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use tallybook_core::IngestSummary;
use tallybook_extract::{FileOutcome, SourceFile};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for a single upload.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Original file name; used for kind detection when the MIME type is vague.
    #[serde(default)]
    pub filename: Option<String>,
}

/// Single upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// The uploaded file.
    pub filename: String,
    /// Records merged into the ledger.
    pub summary: IngestSummary,
}

/// Upload one document as the raw request body.
///
/// The `Content-Type` header carries the document's MIME type.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("empty document".into()));
    }

    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let file = SourceFile {
        filename: query.filename.unwrap_or_else(|| "upload".into()),
        mime_type,
        bytes: body.to_vec(),
    };

    let summary = state.import_one(&file).await?;

    tracing::info!(
        filename = %file.filename,
        invoices = summary.invoices,
        products = summary.products,
        customers = summary.customers,
        "Document imported"
    );

    Ok(Json(UploadResponse {
        filename: file.filename,
        summary,
    }))
}

/// One file of a batch upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Original file name.
    pub filename: String,
    /// Declared MIME type.
    #[serde(default)]
    pub mime_type: String,
    /// Base64-encoded contents.
    pub data: String,
}

/// Batch upload request.
#[derive(Debug, Deserialize)]
pub struct BatchUploadRequest {
    /// Files in processing order.
    pub files: Vec<UploadedFile>,
}

/// Batch upload response.
#[derive(Debug, Serialize)]
pub struct BatchUploadResponse {
    /// Files merged into the ledger.
    pub imported: usize,
    /// Files that failed.
    pub failed: usize,
    /// Per-file results, in request order.
    pub files: Vec<FileOutcome>,
}

/// Upload several documents. Each file succeeds or fails on its own.
pub async fn upload_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchUploadRequest>,
) -> Result<Json<BatchUploadResponse>, ApiError> {
    if body.files.is_empty() {
        return Err(ApiError::BadRequest("files cannot be empty".into()));
    }

    let files = body
        .files
        .into_iter()
        .map(|f| -> Result<SourceFile, ApiError> {
            let bytes = STANDARD.decode(f.data.trim()).map_err(|e| {
                ApiError::BadRequest(format!("{}: invalid base64 data: {e}", f.filename))
            })?;
            Ok(SourceFile {
                filename: f.filename,
                mime_type: f.mime_type,
                bytes,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let outcomes = state.import_batch(files).await;
    let imported = outcomes.iter().filter(|o| o.is_imported()).count();

    Ok(Json(BatchUploadResponse {
        imported,
        failed: outcomes.len() - imported,
        files: outcomes,
    }))
}
