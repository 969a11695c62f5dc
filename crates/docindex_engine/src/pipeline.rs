use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;

use pipeline_logging::pipeline_info;

use crate::crawl::{CrawlError, CrawlOrchestrator};
use crate::publish::{PublishError, Publisher};
use crate::schema::CollectionSchema;
use crate::source::ContentSource;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Crawl(#[from] CrawlError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub total_records: usize,
    pub old_collection: Option<String>,
}

/// Wires one full rebuild: create staging, crawl and index every source,
/// publish atomically, delete the replaced collection.
///
/// Any failure before `publish` aborts the run with the live alias untouched;
/// the partially built staging collection is abandoned for the next run's
/// idempotent create to reclaim.
pub struct IndexPipeline {
    publisher: Publisher,
    orchestrator: CrawlOrchestrator,
    sources: Vec<Arc<dyn ContentSource>>,
    schema: CollectionSchema,
}

impl IndexPipeline {
    pub fn new(
        publisher: Publisher,
        orchestrator: CrawlOrchestrator,
        sources: Vec<Arc<dyn ContentSource>>,
        schema: CollectionSchema,
    ) -> Self {
        Self {
            publisher,
            orchestrator,
            sources,
            schema,
        }
    }

    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        self.publisher.create_staging(&self.schema).await?;

        // The coordinator owns the run total; source tasks increment it
        // concurrently.
        let counter = Arc::new(AtomicUsize::new(0));
        self.orchestrator
            .run(&self.sources, Arc::clone(&counter))
            .await?;

        let old_collection = self.publisher.publish().await?;
        if let Some(old) = &old_collection {
            self.publisher.cleanup_old(old).await?;
        }

        let total_records = counter.load(Ordering::Relaxed);
        pipeline_info!(
            "rebuild finished: {total_records} records in {}",
            self.publisher.staging_collection()
        );
        Ok(PipelineReport {
            total_records,
            old_collection,
        })
    }
}
