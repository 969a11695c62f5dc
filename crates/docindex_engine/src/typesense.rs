use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde_json::{json, Map, Value};
use url::Url;

use docindex_core::NormalizedDocument;

use crate::schema::CollectionSchema;
use crate::store::{CuratedEntry, DocumentStore, ImportOutcome, StoreError};

const API_KEY_HEADER: &str = "x-typesense-api-key";

/// Connection settings for the backing document store.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub base_url: String,
    pub api_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8108".to_string(),
            api_key: String::new(),
            // Bulk imports can run long on large collections.
            request_timeout: Duration::from_secs(30 * 60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Typesense-backed [`DocumentStore`] over the HTTP API.
#[derive(Debug, Clone)]
pub struct TypesenseClient {
    client: reqwest::Client,
    base: Url,
}

impl TypesenseClient {
    pub fn new(settings: StoreSettings) -> Result<Self, StoreError> {
        // A trailing slash keeps `Url::join` appending instead of replacing
        // the last path segment.
        let mut raw = settings.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw).map_err(|err| StoreError::InvalidUrl(err.to_string()))?;

        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&settings.api_key)
            .map_err(|err| StoreError::InvalidUrl(err.to_string()))?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| StoreError::Network(err.to_string()))?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base
            .join(path)
            .map_err(|err| StoreError::InvalidUrl(err.to_string()))
    }

    async fn check(response: Result<Response, reqwest::Error>) -> Result<Response, StoreError> {
        let response = response.map_err(|err| StoreError::Network(err.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let path = response.url().path().to_string();
            return Err(StoreError::NotFound(path));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn list_curated(
        &self,
        collection: &str,
        kind: &str,
    ) -> Result<Vec<CuratedEntry>, StoreError> {
        let url = self.endpoint(&format!("collections/{collection}/{kind}"))?;
        let response = Self::check(self.client.get(url).send().await).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|err| StoreError::InvalidResponse(err.to_string()))?;

        let entries = body
            .get(kind)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        entries
            .into_iter()
            .map(|entry| {
                let Value::Object(mut fields) = entry else {
                    return Err(StoreError::InvalidResponse(format!(
                        "{kind} entry is not an object"
                    )));
                };
                let id = fields
                    .remove("id")
                    .and_then(|id| id.as_str().map(str::to_string))
                    .ok_or_else(|| {
                        StoreError::InvalidResponse(format!("{kind} entry without id"))
                    })?;
                Ok(CuratedEntry { id, body: fields })
            })
            .collect()
    }

    async fn upsert_curated(
        &self,
        collection: &str,
        kind: &str,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let url = self.endpoint(&format!("collections/{collection}/{kind}/{id}"))?;
        Self::check(self.client.put(url).json(body).send().await).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for TypesenseClient {
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), StoreError> {
        let url = self.endpoint("collections")?;
        Self::check(self.client.post(url).json(schema).send().await).await?;
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), StoreError> {
        let url = self.endpoint(&format!("collections/{name}"))?;
        Self::check(self.client.delete(url).send().await).await?;
        Ok(())
    }

    async fn import_documents(
        &self,
        collection: &str,
        batch: &[NormalizedDocument],
    ) -> Result<Vec<ImportOutcome>, StoreError> {
        let url = self.endpoint(&format!("collections/{collection}/documents/import"))?;

        // The import endpoint speaks JSONL: one document per line in, one
        // outcome per line out.
        let mut lines = Vec::with_capacity(batch.len());
        for document in batch {
            let line = serde_json::to_string(document)
                .map_err(|err| StoreError::InvalidResponse(err.to_string()))?;
            lines.push(line);
        }

        let response = Self::check(
            self.client
                .post(url)
                .query(&[("action", "create")])
                .body(lines.join("\n"))
                .send()
                .await,
        )
        .await?;

        let body = response
            .text()
            .await
            .map_err(|err| StoreError::Network(err.to_string()))?;

        body.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<ImportOutcome>(line).map_err(|err| {
                    StoreError::InvalidResponse(format!("bad import outcome line: {err}"))
                })
            })
            .collect()
    }

    async fn get_alias(&self, name: &str) -> Result<Option<String>, StoreError> {
        let url = self.endpoint(&format!("aliases/{name}"))?;
        let response = match Self::check(self.client.get(url).send().await).await {
            Ok(response) => response,
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };

        let body: Value = response
            .json()
            .await
            .map_err(|err| StoreError::InvalidResponse(err.to_string()))?;
        body.get("collection_name")
            .and_then(Value::as_str)
            .map(|name| Some(name.to_string()))
            .ok_or_else(|| StoreError::InvalidResponse("alias without collection_name".into()))
    }

    async fn upsert_alias(&self, name: &str, collection: &str) -> Result<(), StoreError> {
        let url = self.endpoint(&format!("aliases/{name}"))?;
        let body = json!({ "collection_name": collection });
        Self::check(self.client.put(url).json(&body).send().await).await?;
        Ok(())
    }

    async fn list_synonyms(&self, collection: &str) -> Result<Vec<CuratedEntry>, StoreError> {
        self.list_curated(collection, "synonyms").await
    }

    async fn upsert_synonym(
        &self,
        collection: &str,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.upsert_curated(collection, "synonyms", id, body).await
    }

    async fn list_overrides(&self, collection: &str) -> Result<Vec<CuratedEntry>, StoreError> {
        self.list_curated(collection, "overrides").await
    }

    async fn upsert_override(
        &self,
        collection: &str,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.upsert_curated(collection, "overrides", id, body).await
    }
}
