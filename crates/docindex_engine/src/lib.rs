//! Docindex engine: crawl, index, and publish pipeline.
mod crawl;
mod extract;
mod indexer;
mod pipeline;
mod publish;
mod schema;
mod source;
mod store;
mod typesense;
mod types;

pub use crawl::{CrawlError, CrawlOrchestrator, MAX_PAGES_PER_SOURCE};
pub use extract::{HeadingExtractor, RecordExtractor};
pub use indexer::{BatchIndexer, IndexError, DEFAULT_IMPORT_THROTTLE, IMPORT_BATCH_SIZE};
pub use pipeline::{IndexPipeline, PipelineError, PipelineReport};
pub use publish::{PublishError, Publisher};
pub use schema::{default_schema, CollectionSchema, CustomSettings, FieldSchema, PRIORITY_FIELD};
pub use source::{ConfluenceSettings, ConfluenceSource, ContentSource, CrawlFetchError};
pub use store::{CuratedEntry, DocumentStore, ImportOutcome, StoreError};
pub use typesense::{StoreSettings, TypesenseClient};
pub use types::{
    ChannelProgressSink, NullProgressSink, PagePayload, ProgressEvent, ProgressSink, SourceItem,
};
