//! Tallybook HTTP API Service.
//!
//! This crate exposes the tallybook ledger over HTTP:
//!
//! - Document upload and extraction (single and batch)
//! - Grouped invoice, product and customer views with search and sort
//! - Edits and deletes, with renames propagated across collections
//! - CSV export
//!
//! The ledger is held in memory and optionally snapshotted to disk after every change.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the router

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
