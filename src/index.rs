//! Search index abstraction shared by the HTTP surface and the ingestion pipeline.
//!
//! [`SearchIndex`] is the only seam between this crate and the external search engine. The
//! production implementation is [`crate::meili::MeiliService`]; tests plug in in-memory doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// One product document: field name to dynamically typed value.
pub type Record = Map<String, Value>;

/// Errors raised by a [`SearchIndex`] implementation.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Meilisearch transport or response failure.
    #[error(transparent)]
    Meili(#[from] crate::meili::MeiliError),
    /// Failure reported by a non-Meilisearch backend.
    #[error("search backend error: {0}")]
    Backend(String),
}

/// Lifecycle states of an asynchronous indexing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted, waiting in the queue.
    Enqueued,
    /// Currently being applied.
    Processing,
    /// Completed successfully.
    Succeeded,
    /// Completed with an error.
    Failed,
    /// Canceled before completion.
    Canceled,
}

impl TaskStatus {
    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Enqueued => "enqueued",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        };
        f.write_str(label)
    }
}

/// Error detail attached to a failed task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskError {
    /// Human readable description.
    #[serde(default)]
    pub message: String,
    /// Machine readable error code.
    #[serde(default)]
    pub code: String,
    /// Error category (`invalid_request`, `internal`, ...).
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Documentation link for the error code.
    #[serde(default)]
    pub link: String,
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{} ({})", self.message, self.code)
        }
    }
}

/// Observed state of an asynchronous task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Task identifier assigned by the engine.
    pub uid: u64,
    /// Current status.
    pub status: TaskStatus,
    /// Error detail, present when the task failed.
    pub error: Option<TaskError>,
}

/// Acknowledgement returned when the engine accepts a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskInfo {
    /// Identifier to poll for completion.
    pub task_uid: u64,
    /// Status at acceptance time, usually `enqueued`.
    pub status: TaskStatus,
}

/// Document count and indexing flag for the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Number of documents currently stored.
    pub number_of_documents: u64,
    /// Whether the engine is applying pending writes.
    pub is_indexing: bool,
}

/// Search parameters forwarded to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text query; may be empty for pure filter lookups.
    pub query: String,
    /// Maximum number of hits.
    pub limit: usize,
    /// Number of hits to skip.
    pub offset: usize,
    /// Engine filter expression, e.g. `id = 42`.
    pub filter: Option<String>,
    /// Sort rules in `field:asc|desc` form.
    pub sort: Vec<String>,
}

impl SearchQuery {
    /// Free-text query with the given paging.
    pub fn new(query: impl Into<String>, limit: usize, offset: usize) -> Self {
        Self {
            query: query.into(),
            limit,
            offset,
            ..Self::default()
        }
    }

    /// Attach a filter expression.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Attach sort rules.
    pub fn with_sort(mut self, sort: Vec<String>) -> Self {
        self.sort = sort;
        self
    }
}

/// Matched records and hit count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    /// Matching records in ranking order.
    pub hits: Vec<Record>,
    /// Total number of matches across all pages.
    pub total_hits: u64,
    /// Engine-side processing time.
    pub processing_time_ms: u64,
}

/// Index settings applied before ingestion so that filters and sorts are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    /// Attributes usable in filter expressions.
    pub filterable_attributes: Vec<String>,
    /// Attributes usable in sort rules.
    pub sortable_attributes: Vec<String>,
}

/// Operations the catalog needs from the external search engine.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Submit documents for indexing under the given primary key.
    async fn add_documents(
        &self,
        documents: &[Record],
        primary_key: &str,
    ) -> Result<TaskInfo, IndexError>;

    /// Run a search.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, IndexError>;

    /// Fetch index statistics.
    async fn get_stats(&self) -> Result<IndexStats, IndexError>;

    /// Fetch the current state of a task.
    async fn get_task(&self, task_uid: u64) -> Result<Task, IndexError>;

    /// Check that the engine is reachable.
    async fn health(&self) -> Result<(), IndexError>;

    /// Update filterable and sortable attributes.
    async fn update_settings(&self, settings: &IndexSettings) -> Result<TaskInfo, IndexError>;
}
