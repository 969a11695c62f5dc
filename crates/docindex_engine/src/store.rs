use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use docindex_core::NormalizedDocument;

use crate::schema::CollectionSchema;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid store url: {0}")]
    InvalidUrl(String),
    #[error("store returned http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("network error talking to the store: {0}")]
    Network(String),
    #[error("unexpected store response: {0}")]
    InvalidResponse(String),
}

/// Per-document outcome of one bulk-import call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl ImportOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            document: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            document: None,
        }
    }
}

/// Human-authored synonym or override entry attached to a collection.
///
/// `body` holds the entry without its store-assigned `id` key, ready to be
/// re-submitted against another collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CuratedEntry {
    pub id: String,
    pub body: Map<String, Value>,
}

/// Operations the pipeline needs from the backing document store.
///
/// Implementations must tolerate concurrent `import_documents` calls against
/// the same collection; the store serializes document writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), StoreError>;

    /// Deletes a collection. Fails with [`StoreError::NotFound`] if it does
    /// not exist; callers decide whether absence matters.
    async fn delete_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Bulk-imports one batch, returning one outcome per document in input
    /// order.
    async fn import_documents(
        &self,
        collection: &str,
        batch: &[NormalizedDocument],
    ) -> Result<Vec<ImportOutcome>, StoreError>;

    /// Resolves an alias to its current collection, `None` if the alias does
    /// not exist yet.
    async fn get_alias(&self, name: &str) -> Result<Option<String>, StoreError>;

    async fn upsert_alias(&self, name: &str, collection: &str) -> Result<(), StoreError>;

    async fn list_synonyms(&self, collection: &str) -> Result<Vec<CuratedEntry>, StoreError>;

    async fn upsert_synonym(
        &self,
        collection: &str,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<(), StoreError>;

    async fn list_overrides(&self, collection: &str) -> Result<Vec<CuratedEntry>, StoreError>;

    async fn upsert_override(
        &self,
        collection: &str,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<(), StoreError>;
}
