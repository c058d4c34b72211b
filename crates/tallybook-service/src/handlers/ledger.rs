//! Whole-ledger handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use tallybook_core::Ledger;

use crate::state::AppState;

/// Collection sizes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    /// Flat invoice lines.
    pub invoice_lines: usize,
    /// Grouped invoices.
    pub invoices: usize,
    /// Products.
    pub products: usize,
    /// Customers.
    pub customers: usize,
}

impl From<&Ledger> for LedgerSummary {
    fn from(ledger: &Ledger) -> Self {
        Self {
            invoice_lines: ledger.invoices().len(),
            invoices: ledger.grouped_invoices().len(),
            products: ledger.products().len(),
            customers: ledger.customers().len(),
        }
    }
}

/// Current collection sizes.
pub async fn summary(State(state): State<Arc<AppState>>) -> Json<LedgerSummary> {
    Json(state.read(|ledger| LedgerSummary::from(ledger)))
}

/// Empty all three collections.
pub async fn clear(State(state): State<Arc<AppState>>) -> Json<LedgerSummary> {
    Json(state.write(|ledger| {
        ledger.clear();
        LedgerSummary::from(&*ledger)
    }))
}
