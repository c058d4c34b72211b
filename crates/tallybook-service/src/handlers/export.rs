//! Export handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;

use tallybook_core::{CsvWriter, EntityKind, ExportWriter, RecordId};

use crate::error::ApiError;
use crate::state::AppState;

/// Export query parameters.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Comma-separated identities to export; everything when absent or empty.
    /// For invoices these are grouped invoice identities.
    #[serde(default)]
    pub ids: Option<String>,
}

impl ExportQuery {
    fn selection(&self) -> Result<Vec<RecordId>, ApiError> {
        self.ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| id.parse::<RecordId>().map_err(ApiError::from))
            .collect()
    }
}

/// Download a collection as CSV.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kind: EntityKind = kind.parse().map_err(ApiError::BadRequest)?;
    let selection = query.selection()?;

    let table = state.read(|ledger| ledger.export(kind, &selection));
    let writer = CsvWriter;

    tracing::info!(kind = %kind, rows = table.rows.len(), "Exporting records");

    Ok((
        [
            (header::CONTENT_TYPE, writer.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", writer.file_name(kind)),
            ),
        ],
        writer.render(&table),
    ))
}
