//! Snapshot storage for the tallybook ledger.
//!
//! The ledger lives in memory; this crate optionally persists it as a whole so a
//! restarted service can pick up where it left off. Snapshots are CBOR.
//!
//! # Example
//!
//! ```no_run
//! use tallybook_core::Ledger;
//! use tallybook_store::{FileSnapshotStore, SnapshotStore};
//!
//! let store = FileSnapshotStore::new("/tmp/tallybook/ledger.cbor");
//! store.save(&Ledger::new()).unwrap();
//!
//! let restored = store.load().unwrap().map(|s| s.ledger).unwrap_or_default();
//! assert!(restored.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod file;

pub use error::{Result, StoreError};
pub use file::FileSnapshotStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tallybook_core::Ledger;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 2;

/// A persisted ledger.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// The ledger contents.
    pub ledger: Ledger,
}

/// Borrowed form written by [`SnapshotStore::save`], so saving never clones the ledger.
#[derive(Serialize)]
pub(crate) struct SnapshotRef<'a> {
    pub(crate) version: u32,
    pub(crate) saved_at: DateTime<Utc>,
    pub(crate) ledger: &'a Ledger,
}

/// Whole-ledger persistence.
///
/// This trait abstracts the storage layer so the service can run with or without it.
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot exists but cannot be read.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Replace the stored snapshot with `ledger`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save(&self, ledger: &Ledger) -> Result<()>;
}
