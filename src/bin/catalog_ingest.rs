//! Bulk-load product records from a JSON file into the Meilisearch index.
//!
//! Reads the file once, rewrites `"NULL"` strings to null, pushes filterable and sortable
//! attributes, uploads in fixed-size batches, waits for every indexing task, and prints index
//! stats plus optional smoke-query results. Any failure before the stats step aborts the run.
use anyhow::{Context, Result};
use catalogsearch::{
    config,
    index::SearchIndex,
    ingest::{BatchSettings, IngestPipeline, IngestPlan, TaskPoller, catalog_index_settings},
    logging,
    meili::MeiliService,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "catalog-ingest",
    about = "Load product records into the Meilisearch catalog index"
)]
struct Cli {
    /// JSON file containing an array of product objects.
    #[arg(long, default_value = "sku.json")]
    file: PathBuf,
    /// Primary key field declared with every batch.
    #[arg(long, default_value = "id")]
    primary_key: String,
    /// Documents per batch (overrides INGEST_BATCH_SIZE).
    #[arg(long)]
    batch_size: Option<usize>,
    /// Pause between batches in milliseconds (overrides INGEST_BATCH_DELAY_MS).
    #[arg(long)]
    batch_delay_ms: Option<u64>,
    /// Return once batches are accepted instead of waiting for indexing.
    #[arg(long)]
    skip_wait: bool,
    /// Leave filterable/sortable attributes untouched.
    #[arg(long)]
    skip_settings: bool,
    /// Search to run after indexing; repeatable.
    #[arg(long = "smoke-query")]
    smoke_queries: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing("catalog-ingest");
    tracing::debug!(
        meili_url = %config.meili_url,
        index = %config.meili_index,
        has_master_key = config.meili_master_key.is_some(),
        batch_size = config.ingest_batch_size,
        "Loaded configuration"
    );

    let service = MeiliService::from_config(config).context("failed to build Meilisearch client")?;
    service
        .health()
        .await
        .with_context(|| format!("failed to connect to Meilisearch at {}", config.meili_url))?;
    tracing::info!(url = %config.meili_url, index = service.index_uid(), "Connected to Meilisearch");

    let plan = IngestPlan {
        source: cli.file,
        batch: BatchSettings {
            batch_size: cli.batch_size.unwrap_or(config.ingest_batch_size),
            delay: cli
                .batch_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(config.ingest_batch_delay),
            primary_key: cli.primary_key.clone(),
        },
        index_settings: (!cli.skip_settings).then(|| catalog_index_settings(&cli.primary_key)),
        wait: !cli.skip_wait,
        smoke_queries: cli.smoke_queries,
    };
    let poller = TaskPoller::new(config.task_poll_interval, config.task_poll_timeout);

    let report = IngestPipeline::new(&service, poller)
        .run(&plan)
        .await
        .with_context(|| format!("ingestion of {} failed", plan.source.display()))?;

    tracing::info!(
        loaded = report.loaded,
        nulled_fields = report.nulled_fields,
        batches = report.upload.batches(),
        last_task_uid = ?report.upload.last_task_uid(),
        confirmed = report.confirmed,
        documents_in_index = ?report.stats.map(|stats| stats.number_of_documents),
        "Ingestion finished"
    );
    for smoke in &report.smoke {
        match &smoke.outcome {
            Ok(hits) => println!(
                "{:<24} {hits:>6} hits  first: {}",
                smoke.query,
                smoke.first_name.as_deref().unwrap_or("-")
            ),
            Err(err) => println!("{:<24} failed: {err}", smoke.query),
        }
    }
    Ok(())
}
