//! Core types and consistency rules for tallybook.
//!
//! tallybook keeps three denormalized, user-editable collections filled from extracted
//! invoice documents:
//!
//! - **Records**: `Invoice` (flat line items), `Product`, `Customer`
//! - **Ledger**: the container owning all three collections
//! - **Grouping**: `GroupedInvoice`, derived on read by serial number
//! - **Propagation**: renames fanned out across collections joined by name
//! - **Ingestion**: parsing the extractor's reply and assigning identities
//! - **Views and export**: search/sort and delimited-text export
//!
//! # Money
//!
//! Amounts are `i64` minor units ([`Money`]) and travel as JSON numbers in major units.
//!
//! This crate performs no I/O. Every mutation runs to completion synchronously; hosts
//! sharing a [`Ledger`] between threads put the whole value behind one lock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collection;
pub mod content;
pub mod error;
pub mod export;
pub mod grouping;
pub mod ids;
pub mod ingest;
pub mod ledger;
pub mod missing;
pub mod money;
pub mod propagation;
pub mod record;
pub mod view;

pub use collection::Collection;
pub use content::ContentKind;
pub use error::{IngestError, Result};
pub use export::{Cell, CsvWriter, ExportTable, ExportWriter};
pub use grouping::{group_by_serial, GroupedInvoice};
pub use ids::{IdError, IdPrefix, RecordId};
pub use ingest::{
    parse_response, strip_code_fence, CustomerDraft, ExtractedData, IngestSummary,
    InvoiceDraft, ProductDraft,
};
pub use ledger::Ledger;
pub use missing::{compute_missing, Present};
pub use money::Money;
pub use propagation::{DeleteOutcome, GroupEdit, GroupEditOutcome, RenameOutcome};
pub use record::{field, Customer, EntityKind, Invoice, MissingFields, Product, Record};
pub use view::{
    filter_and_sort, CustomerColumn, InvoiceColumn, ProductColumn, SortDirection, SortState,
    SortValue, TableQuery, Tabular,
};
