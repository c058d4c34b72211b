//! Application state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tallybook_core::{IngestSummary, Ledger};
use tallybook_extract::{
    ExtractError, Extractor, FileOutcome, GeminiClient, GeminiOptions, Importer, SourceFile,
};
use tallybook_store::{FileSnapshotStore, SnapshotStore};

use crate::config::ServiceConfig;

/// Application state shared across handlers.
///
/// The ledger sits behind one lock so that every mutation and every grouping read sees a
/// consistent view. The lock is never held across an `.await`. Imports additionally take
/// the import gate for their whole duration, so extractions never run side by side.
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,

    /// Document routing and extraction.
    pub importer: Importer,

    ledger: Mutex<Ledger>,
    import_gate: tokio::sync::Mutex<()>,
    store: Option<Arc<dyn SnapshotStore>>,
}

impl AppState {
    /// Build the production state from configuration.
    #[must_use]
    pub fn from_config(config: ServiceConfig) -> Self {
        let extractor: Option<Arc<dyn Extractor>> = match config.gemini_api_key.as_deref() {
            Some(key) => {
                let options = GeminiOptions {
                    base_url: config.gemini_base_url.clone(),
                    model: config.gemini_model.clone(),
                    ..GeminiOptions::default()
                };
                match GeminiClient::with_options(key, options) {
                    Ok(client) => {
                        tracing::info!(model = %client.model(), "Document extraction enabled");
                        Some(Arc::new(client))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to create Gemini client");
                        None
                    }
                }
            }
            None => None,
        };

        if extractor.is_none() {
            tracing::warn!("Gemini not configured - document uploads will be rejected");
        }

        let store = config.snapshot_path.as_ref().map(|path| {
            tracing::info!(path = %path, "Ledger snapshots enabled");
            Arc::new(FileSnapshotStore::new(path)) as Arc<dyn SnapshotStore>
        });

        Self::new(config, Importer::new(extractor), store)
    }

    /// Create a new application state, restoring the last snapshot when a store is given.
    #[must_use]
    pub fn new(
        config: ServiceConfig,
        importer: Importer,
        store: Option<Arc<dyn SnapshotStore>>,
    ) -> Self {
        let ledger = match store.as_ref().map(|s| s.load()) {
            Some(Ok(Some(snapshot))) => {
                tracing::info!(
                    saved_at = %snapshot.saved_at,
                    invoices = snapshot.ledger.invoices().len(),
                    products = snapshot.ledger.products().len(),
                    customers = snapshot.ledger.customers().len(),
                    "Restored ledger snapshot"
                );
                snapshot.ledger
            }
            Some(Err(e)) => {
                tracing::error!(error = %e, "Failed to load ledger snapshot, starting empty");
                Ledger::new()
            }
            Some(Ok(None)) | None => Ledger::new(),
        };

        Self {
            config,
            importer,
            ledger: Mutex::new(ledger),
            import_gate: tokio::sync::Mutex::new(()),
            store,
        }
    }

    /// Check if document extraction is configured.
    #[must_use]
    pub fn has_extraction(&self) -> bool {
        self.importer.is_available()
    }

    /// Check if snapshots are persisted.
    #[must_use]
    pub fn has_persistence(&self) -> bool {
        self.store.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the ledger.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&*self.lock())
    }

    /// Run `f` against the ledger, then persist a snapshot.
    ///
    /// Persistence is best effort: a failed save is logged and the in-memory ledger
    /// stays authoritative.
    pub fn write<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        let mut ledger = self.lock();
        let result = f(&mut *ledger);
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&ledger) {
                tracing::warn!(error = %e, "Failed to save ledger snapshot");
            }
        }
        result
    }

    /// Import one file, failing with its extraction error.
    pub async fn import_one(&self, file: &SourceFile) -> Result<IngestSummary, ExtractError> {
        let _gate = self.import_gate.lock().await;
        self.importer
            .import_file(file, |data| self.write(|ledger| ledger.ingest(data)))
            .await
    }

    /// Import a batch, one file at a time.
    pub async fn import_batch(&self, files: Vec<SourceFile>) -> Vec<FileOutcome> {
        let _gate = self.import_gate.lock().await;
        self.importer
            .import_batch(files, |data| self.write(|ledger| ledger.ingest(data)))
            .await
    }
}
