//! Error type and wire shapes for the Meilisearch REST API.

use crate::index::{Record, TaskError, TaskStatus};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Errors returned while interacting with Meilisearch.
#[derive(Debug, thiserror::Error)]
pub enum MeiliError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Meilisearch URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Meilisearch responded with an unexpected status code.
    #[error("Unexpected Meilisearch response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Meilisearch.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Response to any write that enqueues a task (`202 Accepted`).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnqueuedTask {
    pub(crate) task_uid: u64,
    pub(crate) status: TaskStatus,
}

/// `GET /tasks/{uid}`.
#[derive(Deserialize)]
pub(crate) struct TaskView {
    pub(crate) uid: u64,
    pub(crate) status: TaskStatus,
    #[serde(default)]
    pub(crate) error: Option<TaskError>,
}

/// Body of `POST /indexes/{uid}/search`.
#[derive(Serialize)]
pub(crate) struct SearchBody<'a> {
    pub(crate) q: &'a str,
    pub(crate) limit: usize,
    pub(crate) offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) filter: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sort: Option<&'a [String]>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub(crate) hits: Vec<Record>,
    #[serde(default)]
    pub(crate) estimated_total_hits: Option<u64>,
    #[serde(default)]
    pub(crate) total_hits: Option<u64>,
    #[serde(default)]
    pub(crate) processing_time_ms: u64,
}

/// `GET /indexes/{uid}/stats`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatsResponse {
    #[serde(default)]
    pub(crate) number_of_documents: u64,
    #[serde(default)]
    pub(crate) is_indexing: bool,
}
