//! Health check handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Whether document extraction is configured.
    pub extraction: bool,
    /// Whether the ledger is persisted.
    pub persistence: bool,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "tallybook".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        extraction: state.has_extraction(),
        persistence: state.has_persistence(),
    })
}
