//! Error definitions and settings for the ingestion pipeline.

use crate::index::{IndexError, TaskError, TaskStatus};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while waiting for an indexing task.
#[derive(Debug, Error)]
pub enum PollError {
    /// Status query failed; polling stops without retrying.
    #[error("failed to query status of task {uid}: {source}")]
    Query {
        /// Task being polled.
        uid: u64,
        /// Underlying index error.
        #[source]
        source: IndexError,
    },
    /// Task reached `failed` or `canceled`.
    #[error("task {uid} {status}: {}", describe_failure(.detail))]
    TaskFailed {
        /// Task that failed.
        uid: u64,
        /// Terminal status observed.
        status: TaskStatus,
        /// Error detail reported by the engine.
        detail: Option<TaskError>,
    },
    /// Deadline passed before the task reached a terminal state.
    #[error("task {uid} did not finish within {waited:?}")]
    TimedOut {
        /// Task still pending.
        uid: u64,
        /// Time spent polling.
        waited: Duration,
    },
}

fn describe_failure(detail: &Option<TaskError>) -> String {
    detail
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "no error detail".into())
}

/// Errors that abort an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Input path.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Input file is not valid JSON.
    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// Top-level JSON value is not an array.
    #[error("expected a JSON array of records")]
    NotAnArray,
    /// Array element at the given position is not an object.
    #[error("record at position {0} is not a JSON object")]
    NotAnObject(usize),
    /// Batch size of zero.
    #[error("batch size must be greater than zero")]
    InvalidBatchSize,
    /// A batch submission was rejected; earlier batches stay submitted.
    #[error("failed to upload batch {batch} (records {start}..{end}): {source}")]
    BatchSubmission {
        /// One-based batch number.
        batch: usize,
        /// First record offset (inclusive).
        start: usize,
        /// Last record offset (exclusive).
        end: usize,
        /// Underlying index error.
        #[source]
        source: IndexError,
    },
    /// Index settings update was rejected.
    #[error("failed to update index settings: {0}")]
    Settings(#[source] IndexError),
    /// Waiting for an indexing task failed.
    #[error(transparent)]
    Poll(#[from] PollError),
}

/// Batching parameters for [`crate::ingest::BatchUploader`].
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Maximum documents per batch.
    pub batch_size: usize,
    /// Pause between successive submissions.
    pub delay: Duration,
    /// Primary key field declared with every submission.
    pub primary_key: String,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            delay: Duration::from_millis(100),
            primary_key: "id".into(),
        }
    }
}

/// Result of a completed upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Task uid of every submitted batch, in submission order.
    pub task_uids: Vec<u64>,
    /// Number of documents submitted.
    pub documents: usize,
}

impl UploadOutcome {
    /// Number of batches submitted.
    pub fn batches(&self) -> usize {
        self.task_uids.len()
    }

    /// Task uid of the final batch, if any batch was submitted.
    pub fn last_task_uid(&self) -> Option<u64> {
        self.task_uids.last().copied()
    }
}
