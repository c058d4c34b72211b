//! Invoice handlers.
//!
//! Invoices are listed and edited as grouped invoices; the flat line items are exposed
//! read-only for inspection.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;

use tallybook_core::{
    filter_and_sort, DeleteOutcome, GroupEdit, GroupEditOutcome, GroupedInvoice, Invoice,
    InvoiceColumn, Ledger, TableQuery,
};

use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::state::AppState;

/// List grouped invoices, filtered and sorted.
pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery<InvoiceColumn>>,
) -> Json<Vec<GroupedInvoice>> {
    let groups = state.read(Ledger::grouped_invoices);
    Json(filter_and_sort(groups, &query))
}

/// List flat invoice lines in collection order.
pub async fn list_flat(State(state): State<Arc<AppState>>) -> Json<Vec<Invoice>> {
    Json(state.read(|ledger| ledger.invoices().as_slice().to_vec()))
}

/// Edit the shared fields of a grouped invoice.
///
/// Changing the product of a group with several lines is rejected. An unknown group is
/// a no-op.
pub async fn update_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(edit): Json<GroupEdit>,
) -> Result<Json<GroupEditOutcome>, ApiError> {
    let id = parse_id(&id)?;

    let outcome = state.write(|ledger| {
        let Some(group) = ledger.find_group(&id) else {
            tracing::debug!(%id, "edit of unknown invoice group ignored");
            return Ok(GroupEditOutcome::default());
        };
        if edit.renames_product_of(&group) {
            return Err(ApiError::BadRequest(
                "product names can only be edited on single-product invoices".into(),
            ));
        }
        Ok(ledger.edit_group(&group, &edit))
    })?;

    Ok(Json(outcome))
}

/// Delete every line of a grouped invoice.
pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, ApiError> {
    let id = parse_id(&id)?;

    let outcome = state.write(|ledger| match ledger.find_group(&id) {
        Some(group) => ledger.delete_group(&group),
        None => {
            tracing::debug!(%id, "delete of unknown invoice group ignored");
            DeleteOutcome::default()
        }
    });

    Ok(Json(outcome))
}
