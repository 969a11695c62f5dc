use std::sync::Arc;

use thiserror::Error;

use pipeline_logging::pipeline_info;

use crate::schema::CollectionSchema;
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to prepare staging collection {name}: {cause}")]
    Staging {
        name: String,
        #[source]
        cause: StoreError,
    },
    #[error("failed to resolve alias {alias}: {cause}")]
    AliasResolve {
        alias: String,
        #[source]
        cause: StoreError,
    },
    #[error("failed to copy curated {kind} into {name}: {cause}")]
    SettingsCopy {
        kind: &'static str,
        name: String,
        #[source]
        cause: StoreError,
    },
    #[error("failed to repoint alias {alias}: {cause}")]
    AliasSwap {
        alias: String,
        #[source]
        cause: StoreError,
    },
    #[error("failed to delete old collection {name}: {cause}")]
    Cleanup {
        name: String,
        #[source]
        cause: StoreError,
    },
}

/// Owns the collection lifecycle around a rebuild. Sole writer of the alias:
/// readers only ever observe it moving from the old collection to a fully
/// built one.
pub struct Publisher {
    store: Arc<dyn DocumentStore>,
    alias: String,
    staging: String,
}

impl Publisher {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        alias: impl Into<String>,
        staging: impl Into<String>,
    ) -> Self {
        Self {
            store,
            alias: alias.into(),
            staging: staging.into(),
        }
    }

    pub fn staging_collection(&self) -> &str {
        &self.staging
    }

    /// Destroys any leftover collection under the staging name, then creates
    /// a fresh, empty one with `schema`. Idempotent; an abandoned staging
    /// collection from an aborted run is reclaimed here.
    pub async fn create_staging(&self, schema: &CollectionSchema) -> Result<(), PublishError> {
        let staging_err = |cause| PublishError::Staging {
            name: self.staging.clone(),
            cause,
        };
        match self.store.delete_collection(&self.staging).await {
            Ok(()) | Err(StoreError::NotFound(_)) => {}
            Err(cause) => return Err(staging_err(cause)),
        }
        self.store.create_collection(schema).await.map_err(staging_err)
    }

    /// Makes the staging collection live and returns the name of the
    /// previous target, if any.
    ///
    /// Curated synonym/override entries are copied from the current target
    /// before the alias moves, so a reader switching to the new collection
    /// never sees them missing. The alias repoint is the single
    /// reader-visible transition.
    pub async fn publish(&self) -> Result<Option<String>, PublishError> {
        let old = self
            .store
            .get_alias(&self.alias)
            .await
            .map_err(|cause| PublishError::AliasResolve {
                alias: self.alias.clone(),
                cause,
            })?;

        if let Some(old_name) = &old {
            self.copy_synonyms(old_name).await?;
            self.copy_overrides(old_name).await?;
        }

        self.store
            .upsert_alias(&self.alias, &self.staging)
            .await
            .map_err(|cause| PublishError::AliasSwap {
                alias: self.alias.clone(),
                cause,
            })?;
        pipeline_info!(
            "alias {} now points at {} (was {:?})",
            self.alias,
            self.staging,
            old
        );
        Ok(old)
    }

    /// Deletes the collection the alias pointed at before the swap. Only
    /// called after a successful repoint; a missing collection is fine, so
    /// the call is retry-safe.
    pub async fn cleanup_old(&self, old: &str) -> Result<(), PublishError> {
        match self.store.delete_collection(old).await {
            Ok(()) | Err(StoreError::NotFound(_)) => Ok(()),
            Err(cause) => Err(PublishError::Cleanup {
                name: old.to_string(),
                cause,
            }),
        }
    }

    async fn copy_synonyms(&self, old: &str) -> Result<(), PublishError> {
        let copy_err = |cause| PublishError::SettingsCopy {
            kind: "synonyms",
            name: self.staging.clone(),
            cause,
        };
        let entries = self.store.list_synonyms(old).await.map_err(copy_err)?;
        for entry in &entries {
            self.store
                .upsert_synonym(&self.staging, &entry.id, &entry.body)
                .await
                .map_err(copy_err)?;
        }
        Ok(())
    }

    async fn copy_overrides(&self, old: &str) -> Result<(), PublishError> {
        let copy_err = |cause| PublishError::SettingsCopy {
            kind: "overrides",
            name: self.staging.clone(),
            cause,
        };
        let entries = self.store.list_overrides(old).await.map_err(copy_err)?;
        for entry in &entries {
            self.store
                .upsert_override(&self.staging, &entry.id, &entry.body)
                .await
                .map_err(copy_err)?;
        }
        Ok(())
    }
}
