//! End-to-end ingestion run: load, clean, configure, upload, wait, report.

use crate::index::{IndexSettings, IndexStats, Record, SearchIndex, SearchQuery};
use crate::ingest::batch::BatchUploader;
use crate::ingest::cleaner::clean_records;
use crate::ingest::loader::load_records;
use crate::ingest::poller::TaskPoller;
use crate::ingest::types::{BatchSettings, IngestError, UploadOutcome};
use serde_json::Value;
use std::path::PathBuf;

/// Attributes the HTTP surface filters and sorts on.
pub fn catalog_index_settings(primary_key: &str) -> IndexSettings {
    let mut filterable = vec![primary_key.to_string()];
    for field in ["category_id", "category_name", "status"] {
        if field != primary_key {
            filterable.push(field.to_string());
        }
    }
    IndexSettings {
        filterable_attributes: filterable,
        sortable_attributes: ["name", "created_at", "updated_at", "selling_price"]
            .into_iter()
            .map(String::from)
            .collect(),
    }
}

/// What an ingestion run should do.
#[derive(Debug, Clone)]
pub struct IngestPlan {
    /// JSON file holding the records.
    pub source: PathBuf,
    /// Batching parameters.
    pub batch: BatchSettings,
    /// Settings pushed before upload; `None` leaves the index as is.
    pub index_settings: Option<IndexSettings>,
    /// Wait for every enqueued task to settle.
    pub wait: bool,
    /// Queries run once indexing has finished.
    pub smoke_queries: Vec<String>,
}

/// Outcome of a smoke query.
#[derive(Debug, Clone)]
pub struct SmokeResult {
    /// Query text.
    pub query: String,
    /// Hit count, or the failure message.
    pub outcome: Result<u64, String>,
    /// `name` of the first hit, when present.
    pub first_name: Option<String>,
}

/// Summary of a finished ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Records read from the source.
    pub loaded: usize,
    /// Fields rewritten from `"NULL"` to null.
    pub nulled_fields: usize,
    /// Upload result.
    pub upload: UploadOutcome,
    /// Whether all tasks were confirmed as succeeded.
    pub confirmed: bool,
    /// Index stats after the run; `None` when the query failed.
    pub stats: Option<IndexStats>,
    /// Smoke query results.
    pub smoke: Vec<SmokeResult>,
}

/// Runs ingestion plans against an index.
pub struct IngestPipeline<'a, I: SearchIndex + ?Sized> {
    index: &'a I,
    poller: TaskPoller,
}

impl<'a, I: SearchIndex + ?Sized> IngestPipeline<'a, I> {
    /// Pipeline using `poller` for every wait.
    pub fn new(index: &'a I, poller: TaskPoller) -> Self {
        Self { index, poller }
    }

    /// Load the plan's source file and ingest it.
    pub async fn run(&self, plan: &IngestPlan) -> Result<IngestReport, IngestError> {
        let records = load_records(&plan.source).await?;
        self.ingest(records, plan).await
    }

    /// Ingest already-parsed records.
    pub async fn ingest(
        &self,
        records: Vec<Record>,
        plan: &IngestPlan,
    ) -> Result<IngestReport, IngestError> {
        let uploader = BatchUploader::new(plan.batch.clone())?;
        let loaded = records.len();
        let (records, nulled_fields) = clean_records(records);
        tracing::info!(records = loaded, nulled_fields, "Cleaned records");

        let mut pending = Vec::new();
        if let Some(settings) = &plan.index_settings {
            let info = self
                .index
                .update_settings(settings)
                .await
                .map_err(IngestError::Settings)?;
            tracing::info!(task_uid = info.task_uid, "Index settings update enqueued");
            pending.push(info.task_uid);
        }

        let upload = uploader.upload(self.index, &records).await?;
        tracing::info!(
            documents = upload.documents,
            batches = upload.batches(),
            "All batches accepted"
        );
        pending.extend_from_slice(&upload.task_uids);

        // Meilisearch applies tasks in enqueue order, so settings land before any batch.
        let confirmed = if plan.wait && !pending.is_empty() {
            tracing::info!(tasks = pending.len(), "Waiting for indexing tasks");
            self.poller.wait_for_all(self.index, &pending).await?;
            tracing::info!("Indexing complete");
            true
        } else {
            false
        };

        let stats = match self.index.get_stats().await {
            Ok(stats) => {
                tracing::info!(
                    documents = stats.number_of_documents,
                    is_indexing = stats.is_indexing,
                    "Index stats"
                );
                Some(stats)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Could not fetch index stats");
                None
            }
        };

        let mut smoke = Vec::with_capacity(plan.smoke_queries.len());
        for query in &plan.smoke_queries {
            smoke.push(self.smoke_query(query).await);
        }

        Ok(IngestReport {
            loaded,
            nulled_fields,
            upload,
            confirmed,
            stats,
            smoke,
        })
    }

    async fn smoke_query(&self, query: &str) -> SmokeResult {
        match self.index.search(&SearchQuery::new(query, 5, 0)).await {
            Ok(result) => {
                let first_name = result
                    .hits
                    .first()
                    .and_then(|hit| hit.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                tracing::info!(query, hits = result.total_hits, first = ?first_name, "Smoke query");
                SmokeResult {
                    query: query.to_string(),
                    outcome: Ok(result.total_hits),
                    first_name,
                }
            }
            Err(err) => {
                tracing::warn!(query, error = %err, "Smoke query failed");
                SmokeResult {
                    query: query.to_string(),
                    outcome: Err(err.to_string()),
                    first_name: None,
                }
            }
        }
    }
}
