//! Customer handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;

use tallybook_core::{
    filter_and_sort, Customer, CustomerColumn, DeleteOutcome, RenameOutcome, TableQuery,
};

use crate::error::ApiError;
use crate::handlers::{parse_id, record_with_id};
use crate::state::AppState;

/// List customers, filtered and sorted.
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery<CustomerColumn>>,
) -> Json<Vec<Customer>> {
    let customers = state.read(|ledger| ledger.customers().as_slice().to_vec());
    Json(filter_and_sort(customers, &query))
}

/// Replace a customer.
///
/// A rename moves every invoice naming the old customer to the new name, and the
/// purchase total is recomputed from those invoices.
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<RenameOutcome>, ApiError> {
    let id = parse_id(&id)?;
    let customer: Customer = record_with_id(&id, body)?;

    Ok(Json(state.write(|ledger| ledger.edit_customer(customer))))
}

/// Delete a customer. Invoices naming it are left untouched.
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.write(|ledger| ledger.delete_customer(&id))))
}
