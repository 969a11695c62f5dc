use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;

use docindex_core::{transform, MalformedRecordError, NormalizedDocument};
use pipeline_logging::{pipeline_debug, pipeline_info};

use crate::extract::RecordExtractor;
use crate::indexer::{BatchIndexer, IndexError};
use crate::source::{ContentSource, CrawlFetchError};

/// Hard bound on pages fetched from one source. A source still paginating
/// past this is treated as a runaway cursor, not crawled further.
pub const MAX_PAGES_PER_SOURCE: u64 = 10_000;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("fetch failed for source {source}: {cause}")]
    Fetch {
        source: String,
        #[source]
        cause: CrawlFetchError,
    },
    #[error(transparent)]
    Record(#[from] MalformedRecordError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error("pagination stalled for source {src}: cursor stuck at start={start}")]
    StalledPagination { src: String, start: u64 },
    #[error("source {src} exceeded {pages} pages without exhausting")]
    PageLimitExceeded { src: String, pages: u64 },
    #[error("source task failed: {0}")]
    Join(String),
}

/// Drives every content source to exhaustion and feeds extracted records
/// through the transformer into the indexer.
///
/// Sources crawl as independent concurrent tasks; within a source, pages are
/// fetched sequentially because each cursor depends on the previous response.
pub struct CrawlOrchestrator {
    extractor: Arc<dyn RecordExtractor>,
    indexer: BatchIndexer,
}

impl CrawlOrchestrator {
    pub fn new(extractor: Arc<dyn RecordExtractor>, indexer: BatchIndexer) -> Self {
        Self { extractor, indexer }
    }

    /// Crawls all sources, adding every indexed record to `counter`. The
    /// first error from any source aborts the remaining tasks; the run can
    /// never publish once a source failed.
    pub async fn run(
        &self,
        sources: &[Arc<dyn ContentSource>],
        counter: Arc<AtomicUsize>,
    ) -> Result<(), CrawlError> {
        let mut tasks = JoinSet::new();
        for source in sources {
            let source = Arc::clone(source);
            let extractor = Arc::clone(&self.extractor);
            let indexer = self.indexer.clone();
            let counter = Arc::clone(&counter);
            tasks.spawn(async move { crawl_source(source, extractor, indexer, counter).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tasks.abort_all();
                    return Err(err);
                }
                Err(err) if err.is_cancelled() => {}
                Err(err) => {
                    tasks.abort_all();
                    return Err(CrawlError::Join(err.to_string()));
                }
            }
        }
        Ok(())
    }
}

async fn crawl_source(
    source: Arc<dyn ContentSource>,
    extractor: Arc<dyn RecordExtractor>,
    indexer: BatchIndexer,
    counter: Arc<AtomicUsize>,
) -> Result<(), CrawlError> {
    let label = source.label().to_string();
    let mut start = 0u64;
    let mut pages = 0u64;

    loop {
        let payload = source
            .fetch_page(start)
            .await
            .map_err(|cause| CrawlError::Fetch {
                source: label.clone(),
                cause,
            })?;
        pages += 1;

        let mut documents: Vec<NormalizedDocument> = Vec::new();
        for item in &payload.items {
            for record in extractor.extract(&item.body, &item.url, item.wiki) {
                documents.push(transform(&record)?);
            }
        }

        if !documents.is_empty() {
            let count = indexer.index(&documents, &label).await?;
            counter.fetch_add(count, Ordering::Relaxed);
        }
        pipeline_debug!(
            "{label}: page at start={start} yielded {} records",
            documents.len()
        );

        // `size < limit` is the exhaustion signal.
        if payload.size != payload.limit {
            break;
        }
        if pages >= MAX_PAGES_PER_SOURCE {
            return Err(CrawlError::PageLimitExceeded {
                src: label,
                pages,
            });
        }

        let next = payload.start + payload.limit;
        if next <= start {
            return Err(CrawlError::StalledPagination {
                src: label,
                start,
            });
        }
        start = next;
    }

    pipeline_info!("{label}: exhausted after {pages} page(s)");
    Ok(())
}
