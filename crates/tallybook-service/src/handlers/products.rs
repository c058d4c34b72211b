//! Product handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;

use tallybook_core::{
    filter_and_sort, DeleteOutcome, Product, ProductColumn, RenameOutcome, TableQuery,
};

use crate::error::ApiError;
use crate::handlers::{parse_id, record_with_id};
use crate::state::AppState;

/// List products, filtered and sorted.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery<ProductColumn>>,
) -> Json<Vec<Product>> {
    let products = state.read(|ledger| ledger.products().as_slice().to_vec());
    Json(filter_and_sort(products, &query))
}

/// Replace a product; a rename follows onto every invoice naming it.
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<RenameOutcome>, ApiError> {
    let id = parse_id(&id)?;
    let product: Product = record_with_id(&id, body)?;

    Ok(Json(state.write(|ledger| ledger.edit_product(product))))
}

/// Delete a product. Invoices naming it are left untouched.
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.write(|ledger| ledger.delete_product(&id))))
}
