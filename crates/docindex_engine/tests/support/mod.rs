#![allow(dead_code)]
//! Shared fakes for engine tests: an in-memory document store with failure
//! injection, a scripted content source, and a counting extractor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use docindex_core::{transform, CandidateRecord, NormalizedDocument, Weight};
use docindex_engine::{
    CollectionSchema, ContentSource, CrawlFetchError, CuratedEntry, DocumentStore, ImportOutcome,
    PagePayload, ProgressEvent, ProgressSink, RecordExtractor, SourceItem, StoreError,
};

/// Builds `n` valid normalized documents.
pub fn docs(n: usize) -> Vec<NormalizedDocument> {
    (0..n)
        .map(|i| {
            let record = CandidateRecord {
                url: format!("https://docs.example.com/page/{i}"),
                weight: Some(Weight::new(1, 0, (n - i) as i64)),
                ..CandidateRecord::default()
            };
            transform(&record).unwrap()
        })
        .collect()
}

#[derive(Default)]
pub struct FakeCollection {
    pub schema: Option<CollectionSchema>,
    pub documents: Vec<NormalizedDocument>,
    pub synonyms: Vec<CuratedEntry>,
    pub overrides: Vec<CuratedEntry>,
}

#[derive(Default)]
struct StoreState {
    collections: HashMap<String, FakeCollection>,
    aliases: HashMap<String, String>,
    // (collection, batch size) per import call, in order.
    import_calls: Vec<(String, usize)>,
}

/// In-memory [`DocumentStore`] with per-call failure injection.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    /// Import-call indexes (0-based across the store's lifetime) whose first
    /// document is reported as rejected.
    reject_on_calls: Mutex<Vec<usize>>,
    /// Import-call index that fails with a transport error instead.
    transport_fail_on_call: Mutex<Option<usize>>,
    fail_synonym_upsert: Mutex<bool>,
    import_call_count: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_on_call(&self, call: usize) {
        self.reject_on_calls.lock().unwrap().push(call);
    }

    pub fn transport_fail_on_call(&self, call: usize) {
        *self.transport_fail_on_call.lock().unwrap() = Some(call);
    }

    pub fn fail_synonym_upserts(&self) {
        *self.fail_synonym_upsert.lock().unwrap() = true;
    }

    pub fn import_calls(&self) -> Vec<(String, usize)> {
        self.state.lock().unwrap().import_calls.clone()
    }

    pub fn alias_target(&self, name: &str) -> Option<String> {
        self.state.lock().unwrap().aliases.get(name).cloned()
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.state.lock().unwrap().collections.contains_key(name)
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .map(|c| c.documents.len())
            .unwrap_or(0)
    }

    pub fn collection_schema(&self, name: &str) -> Option<CollectionSchema> {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(name)
            .and_then(|c| c.schema.clone())
    }

    pub fn synonym_ids(&self, collection: &str) -> Vec<String> {
        self.curated_ids(collection, false)
    }

    pub fn override_ids(&self, collection: &str) -> Vec<String> {
        self.curated_ids(collection, true)
    }

    fn curated_ids(&self, collection: &str, overrides: bool) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let Some(collection) = state.collections.get(collection) else {
            return Vec::new();
        };
        let entries = if overrides {
            &collection.overrides
        } else {
            &collection.synonyms
        };
        let mut ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids
    }

    /// Seeds a collection that existed before the run, with documents and
    /// curated entries.
    pub fn seed_collection(
        &self,
        name: &str,
        documents: Vec<NormalizedDocument>,
        synonyms: Vec<CuratedEntry>,
        overrides: Vec<CuratedEntry>,
    ) {
        let mut state = self.state.lock().unwrap();
        state.collections.insert(
            name.to_string(),
            FakeCollection {
                schema: None,
                documents,
                synonyms,
                overrides,
            },
        );
    }

    pub fn seed_alias(&self, name: &str, collection: &str) {
        self.state
            .lock()
            .unwrap()
            .aliases
            .insert(name.to_string(), collection.to_string());
    }
}

pub fn curated_entry(id: &str, key: &str, value: &str) -> CuratedEntry {
    let mut body = Map::new();
    body.insert(key.to_string(), Value::String(value.to_string()));
    CuratedEntry {
        id: id.to_string(),
        body,
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.collections.contains_key(&schema.name) {
            return Err(StoreError::Http {
                status: 409,
                body: format!("collection {} already exists", schema.name),
            });
        }
        state.collections.insert(
            schema.name.clone(),
            FakeCollection {
                schema: Some(schema.clone()),
                ..FakeCollection::default()
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state
            .collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn import_documents(
        &self,
        collection: &str,
        batch: &[NormalizedDocument],
    ) -> Result<Vec<ImportOutcome>, StoreError> {
        let call = self.import_call_count.fetch_add(1, Ordering::SeqCst);
        if *self.transport_fail_on_call.lock().unwrap() == Some(call) {
            return Err(StoreError::Network("connection reset".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        state
            .import_calls
            .push((collection.to_string(), batch.len()));
        let target = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound(collection.to_string()))?;

        let reject_first = self.reject_on_calls.lock().unwrap().contains(&call);
        let outcomes = batch
            .iter()
            .enumerate()
            .map(|(i, document)| {
                if reject_first && i == 0 {
                    ImportOutcome::failed("document rejected by schema")
                } else {
                    target.documents.push(document.clone());
                    ImportOutcome::ok()
                }
            })
            .collect();
        Ok(outcomes)
    }

    async fn get_alias(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state.lock().unwrap().aliases.get(name).cloned())
    }

    async fn upsert_alias(&self, name: &str, collection: &str) -> Result<(), StoreError> {
        self.state
            .lock()
            .unwrap()
            .aliases
            .insert(name.to_string(), collection.to_string());
        Ok(())
    }

    async fn list_synonyms(&self, collection: &str) -> Result<Vec<CuratedEntry>, StoreError> {
        let state = self.state.lock().unwrap();
        let collection = state
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::NotFound(collection.to_string()))?;
        Ok(collection.synonyms.clone())
    }

    async fn upsert_synonym(
        &self,
        collection: &str,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        if *self.fail_synonym_upsert.lock().unwrap() {
            return Err(StoreError::Http {
                status: 503,
                body: "synonym writes disabled".to_string(),
            });
        }
        let mut state = self.state.lock().unwrap();
        let collection = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound(collection.to_string()))?;
        collection.synonyms.retain(|e| e.id != id);
        collection.synonyms.push(CuratedEntry {
            id: id.to_string(),
            body: body.clone(),
        });
        Ok(())
    }

    async fn list_overrides(&self, collection: &str) -> Result<Vec<CuratedEntry>, StoreError> {
        let state = self.state.lock().unwrap();
        let collection = state
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::NotFound(collection.to_string()))?;
        Ok(collection.overrides.clone())
    }

    async fn upsert_override(
        &self,
        collection: &str,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let collection = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound(collection.to_string()))?;
        collection.overrides.retain(|e| e.id != id);
        collection.overrides.push(CuratedEntry {
            id: id.to_string(),
            body: body.clone(),
        });
        Ok(())
    }
}

/// One scripted page: how many records its single item expands to, plus the
/// pagination metadata returned to the orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedPage {
    pub records: usize,
    pub size: u64,
    pub limit: u64,
}

/// Content source that replays a fixed page script and counts fetches.
pub struct ScriptedSource {
    label: String,
    pages: Vec<ScriptedPage>,
    fetches: AtomicUsize,
    fail_on_fetch: Option<usize>,
}

impl ScriptedSource {
    pub fn new(label: &str, pages: Vec<ScriptedPage>) -> Self {
        Self {
            label: label.to_string(),
            pages,
            fetches: AtomicUsize::new(0),
            fail_on_fetch: None,
        }
    }

    pub fn failing_at(mut self, fetch: usize) -> Self {
        self.fail_on_fetch = Some(fetch);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch_page(&self, start: u64) -> Result<PagePayload, CrawlFetchError> {
        let fetch = self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_fetch == Some(fetch) {
            return Err(CrawlFetchError::HttpStatus {
                status: 500,
                url: self.label.clone(),
            });
        }
        let page = self.pages.get(fetch).copied().unwrap_or(ScriptedPage {
            records: 0,
            size: 0,
            limit: 1,
        });
        let items = if page.records > 0 {
            vec![SourceItem {
                url: format!("{}/page-{fetch}", self.label),
                body: page.records.to_string(),
                wiki: false,
            }]
        } else {
            Vec::new()
        };
        Ok(PagePayload {
            items,
            size: page.size,
            limit: page.limit,
            start,
        })
    }
}

/// Extractor whose input body is just the number of records to produce.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingExtractor;

impl RecordExtractor for CountingExtractor {
    fn extract(&self, body: &str, url: &str, _wiki: bool) -> Vec<CandidateRecord> {
        let count: usize = body.trim().parse().unwrap_or(0);
        (0..count)
            .map(|i| CandidateRecord {
                url: format!("{url}#{i}"),
                url_without_anchor: Some(url.to_string()),
                weight: Some(Weight::new(1, 0, (count - i) as i64)),
                ..CandidateRecord::default()
            })
            .collect()
    }
}

/// Progress sink collecting events for assertions.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for CollectingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}
