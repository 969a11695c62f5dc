mod config;
mod logging;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use docindex_engine::{
    default_schema, BatchIndexer, ChannelProgressSink, ConfluenceSettings, ConfluenceSource,
    ContentSource, CrawlOrchestrator, HeadingExtractor, IndexPipeline, PipelineReport,
    ProgressEvent, Publisher, StoreSettings, TypesenseClient,
};
use pipeline_logging::{pipeline_error, pipeline_info};

use crate::config::{RunConfig, SourceConfig};
use crate::logging::LogDestination;

const STORE_URL_ENV: &str = "DOCINDEX_STORE_URL";
const STORE_API_KEY_ENV: &str = "DOCINDEX_STORE_API_KEY";

/// Rebuild a documentation search index from a run config.
#[derive(Debug, Parser)]
#[command(name = "docindex")]
struct Cli {
    /// Path to the run configuration file.
    config: PathBuf,
    /// Where log output goes.
    #[arg(long, value_enum, default_value = "terminal")]
    log: LogDestination,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log);

    match run(&cli) {
        Ok(report) => {
            pipeline_info!(
                "done: {} records indexed, replaced {:?}",
                report.total_records,
                report.old_collection
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            pipeline_error!("index rebuild failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<PipelineReport> {
    let config = RunConfig::load(&cli.config)?;
    let store = Arc::new(TypesenseClient::new(store_settings_from_env()?)?);

    let staging = config.staging_collection();
    let mut schema = default_schema(&staging, &config.locale);
    if let Some(custom) = &config.custom_settings {
        schema = schema.with_custom_settings(custom);
    }

    let sources = build_sources(&config)?;

    // The engine only emits progress events; rendering them is this
    // binary's job.
    let (tx, rx) = mpsc::channel::<ProgressEvent>();
    let reporter = thread::spawn(move || {
        for event in rx {
            pipeline_info!(
                "> docindex: {} ({} records)",
                event.source,
                event.record_count
            );
        }
    });

    let mut indexer = BatchIndexer::new(
        Arc::clone(&store) as _,
        staging.clone(),
        Arc::new(ChannelProgressSink::new(tx)),
    );
    if let Some(throttle_ms) = config.import_throttle_ms {
        indexer = indexer.with_throttle(Duration::from_millis(throttle_ms));
    }

    let pipeline = IndexPipeline::new(
        Publisher::new(Arc::clone(&store) as _, config.index_name.clone(), staging),
        CrawlOrchestrator::new(Arc::new(HeadingExtractor::new(config.page_rank)), indexer),
        sources,
        schema,
    );

    let runtime = tokio::runtime::Runtime::new().context("tokio runtime")?;
    let result = runtime.block_on(pipeline.run());

    // Dropping the pipeline drops the sink, ending the reporter thread.
    drop(pipeline);
    let _ = reporter.join();

    Ok(result?)
}

fn build_sources(config: &RunConfig) -> anyhow::Result<Vec<Arc<dyn ContentSource>>> {
    config
        .sources
        .iter()
        .map(|source| match source {
            SourceConfig::Confluence {
                base_url,
                space_key,
                page_limit,
                token_env,
            } => {
                let api_token = token_env
                    .as_deref()
                    .map(|name| {
                        env::var(name)
                            .with_context(|| format!("source token env var {name} is not set"))
                    })
                    .transpose()?;
                let source = ConfluenceSource::new(ConfluenceSettings {
                    base_url: base_url.clone(),
                    space_key: space_key.clone(),
                    page_limit: *page_limit,
                    api_token,
                    ..ConfluenceSettings::default()
                })
                .with_context(|| format!("building source for {base_url}"))?;
                Ok(Arc::new(source) as Arc<dyn ContentSource>)
            }
        })
        .collect()
}

fn store_settings_from_env() -> anyhow::Result<StoreSettings> {
    let base_url = env::var(STORE_URL_ENV)
        .with_context(|| format!("{STORE_URL_ENV} must point at the document store"))?;
    let api_key = env::var(STORE_API_KEY_ENV)
        .with_context(|| format!("{STORE_API_KEY_ENV} must hold the store api key"))?;
    Ok(StoreSettings {
        base_url,
        api_key,
        ..StoreSettings::default()
    })
}
