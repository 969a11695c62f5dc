use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use docindex_core::NormalizedDocument;

use crate::store::{DocumentStore, ImportOutcome, StoreError};
use crate::types::{ProgressEvent, ProgressSink};

/// Documents per bulk-import call.
pub const IMPORT_BATCH_SIZE: usize = 50;

/// Pause after each page import to bound load on the store. Not a
/// correctness requirement; tests run with a zero throttle.
pub const DEFAULT_IMPORT_THROTTLE: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("bulk import rejected {} document(s)", .failures.len())]
    ImportFailed { failures: Vec<ImportOutcome> },
    #[error("bulk import failed: {0}")]
    Store(#[from] StoreError),
}

/// Loads normalized documents into the staging collection in fixed-size
/// batches. All-or-nothing per call: a single rejected document fails the
/// call, and with it the run.
#[derive(Clone)]
pub struct BatchIndexer {
    store: Arc<dyn DocumentStore>,
    collection: String,
    sink: Arc<dyn ProgressSink>,
    throttle: Duration,
}

impl BatchIndexer {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            sink,
            throttle: DEFAULT_IMPORT_THROTTLE,
        }
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Imports one page worth of documents, returning the record count.
    ///
    /// Every failed outcome across all batches of the call is collected and
    /// reported together; transport errors abort immediately. On success a
    /// progress event is emitted for `source_label`.
    pub async fn index(
        &self,
        documents: &[NormalizedDocument],
        source_label: &str,
    ) -> Result<usize, IndexError> {
        let mut failures = Vec::new();
        for batch in documents.chunks(IMPORT_BATCH_SIZE) {
            let outcomes = self.store.import_documents(&self.collection, batch).await?;
            failures.extend(outcomes.into_iter().filter(|outcome| !outcome.success));
        }
        if !failures.is_empty() {
            return Err(IndexError::ImportFailed { failures });
        }

        self.sink.emit(ProgressEvent {
            source: source_label.to_string(),
            record_count: documents.len(),
        });

        if !self.throttle.is_zero() {
            tokio::time::sleep(self.throttle).await;
        }
        Ok(documents.len())
    }
}
