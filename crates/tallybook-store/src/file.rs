//! File-backed snapshot storage.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tallybook_core::Ledger;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::{Snapshot, SnapshotRef, SnapshotStore, SNAPSHOT_VERSION};

/// Stores the snapshot in a single file, replaced atomically on each save.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Use the file at `path`. Nothing is touched until the first load or save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ledger".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = Self::deserialize(&data)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: snapshot.version,
            });
        }
        debug!(path = %self.path.display(), saved_at = %snapshot.saved_at, "snapshot loaded");
        Ok(Some(snapshot))
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let data = Self::serialize(&SnapshotRef {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            ledger,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, &data)?;
        fs::rename(&temp, &self.path)?;

        debug!(path = %self.path.display(), bytes = data.len(), "snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallybook_core::{parse_response, GroupEdit, Money};
    use tempfile::TempDir;

    fn create_test_store() -> (FileSnapshotStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested").join("ledger.cbor"));
        (store, dir)
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.ingest(
            parse_response(
                r#"{
                "invoices": [
                    {"serialNumber": "S1", "customerName": "Bob", "productName": "Pen",
                     "quantity": 2, "tax": 1.25, "totalAmount": 10.5, "date": "2024-01-01"},
                    {"serialNumber": "S1", "customerName": "Bob", "productName": "Cup",
                     "quantity": 1, "tax": 0.5, "date": "2024-01-01"}
                ],
                "products": [{"name": "Pen", "quantity": 2, "unitPrice": 4.5}],
                "customers": [{"name": "Bob", "phoneNumber": "555", "totalPurchaseAmount": 10.5,
                               "email": "bob@example.com"}]
            }"#,
            )
            .unwrap(),
        );
        ledger
    }

    #[test]
    fn missing_file_loads_as_none() {
        let (store, _dir) = create_test_store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_restores_ledger() {
        let (store, _dir) = create_test_store();
        let ledger = sample_ledger();

        store.save(&ledger).unwrap();
        let snapshot = store.load().unwrap().unwrap();

        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.ledger, ledger);
        assert_eq!(snapshot.ledger.grouped_invoices().len(), 1);
    }

    #[test]
    fn amounts_round_trip_to_the_cent() {
        let (store, _dir) = create_test_store();
        let mut ledger = Ledger::new();
        ledger.ingest(parse_response(r#"{"customers": [{"name": "Zed"}]}"#).unwrap());
        let mut zed = ledger.customers().as_slice()[0].clone();
        zed.total_purchase_amount = Some(Money::from_cents(9_007_199_254_740_993));
        ledger.edit_customer(zed);

        store.save(&ledger).unwrap();
        let restored = store.load().unwrap().unwrap().ledger;

        assert_eq!(
            restored.customers().as_slice()[0].total_purchase_amount,
            Some(Money::from_cents(9_007_199_254_740_993))
        );
    }

    #[test]
    fn later_save_replaces_earlier_one() {
        let (store, _dir) = create_test_store();
        let mut ledger = sample_ledger();
        store.save(&ledger).unwrap();

        let group = ledger.grouped_invoices().remove(0);
        ledger.edit_group(
            &group,
            &GroupEdit {
                customer_name: Some("Alice".into()),
                ..GroupEdit::default()
            },
        );
        store.save(&ledger).unwrap();

        let restored = store.load().unwrap().unwrap().ledger;
        assert_eq!(restored.customers().as_slice()[0].name, "Alice");
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let (store, _dir) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), b"not cbor at all").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Serialization(_))));
    }
}
