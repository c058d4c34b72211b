//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{customers, documents, export, health, invoices, ledger, products};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent document uploads. Imports are serialized by the import gate;
/// this only bounds how many uploads may queue in memory.
const DOCUMENT_MAX_CONCURRENT_REQUESTS: usize = 4;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Documents
/// - `POST /v1/documents` - Upload one document (raw body)
/// - `POST /v1/documents/batch` - Upload several base64-encoded documents
///
/// ## Invoices
/// - `GET /v1/invoices` - Grouped invoices
/// - `GET /v1/invoices/flat` - Flat invoice lines
/// - `PUT /v1/invoices/groups/:id` - Edit a grouped invoice
/// - `DELETE /v1/invoices/groups/:id` - Delete a grouped invoice
///
/// ## Products and customers
/// - `GET /v1/products`, `PUT|DELETE /v1/products/:id`
/// - `GET /v1/customers`, `PUT|DELETE /v1/customers/:id`
///
/// ## Export and ledger
/// - `GET /v1/export/:kind` - CSV download
/// - `GET /v1/ledger` - Collection sizes
/// - `DELETE /v1/ledger` - Clear everything
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let document_routes = Router::new()
        .route("/", post(documents::upload_document))
        .route("/batch", post(documents::upload_batch))
        .layer(ConcurrencyLimitLayer::new(DOCUMENT_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Invoices
        .route("/invoices", get(invoices::list_groups))
        .route("/invoices/flat", get(invoices::list_flat))
        .route(
            "/invoices/groups/:id",
            put(invoices::update_group).delete(invoices::delete_group),
        )
        // Products
        .route("/products", get(products::list_products))
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        // Customers
        .route("/customers", get(customers::list_customers))
        .route(
            "/customers/:id",
            put(customers::update_customer).delete(customers::delete_customer),
        )
        // Export
        .route("/export/:kind", get(export::export))
        // Ledger
        .route("/ledger", get(ledger::summary).delete(ledger::clear))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS))
        // Documents (with their own concurrency limit)
        .nest("/documents", document_routes);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
