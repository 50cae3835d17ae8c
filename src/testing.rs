//! In-memory [`SearchIndex`] double used by unit tests.

use crate::index::{
    IndexError, IndexSettings, IndexStats, Record, SearchIndex, SearchQuery, SearchResult, Task,
    TaskInfo, TaskStatus,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub(crate) struct UploadCall {
    pub(crate) documents: Vec<Record>,
    pub(crate) primary_key: String,
    pub(crate) at: Instant,
}

pub(crate) struct FakeState {
    pub(crate) uploads: Vec<UploadCall>,
    pub(crate) searches: Vec<SearchQuery>,
    pub(crate) task_queries: Vec<u64>,
    pub(crate) settings: Vec<IndexSettings>,
    /// Scripted `get_task` answers, consumed front to back.
    pub(crate) task_script: VecDeque<Result<TaskStatus, String>>,
    /// Status reported once the script is exhausted.
    pub(crate) steady_status: TaskStatus,
    /// One-based batch number whose upload is rejected.
    pub(crate) reject_upload: Option<usize>,
    pub(crate) search_result: Result<SearchResult, String>,
    pub(crate) stats: Result<IndexStats, String>,
    pub(crate) next_task_uid: u64,
}

pub(crate) struct FakeIndex {
    state: Mutex<FakeState>,
}

impl FakeIndex {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                uploads: Vec::new(),
                searches: Vec::new(),
                task_queries: Vec::new(),
                settings: Vec::new(),
                task_script: VecDeque::new(),
                steady_status: TaskStatus::Succeeded,
                reject_upload: None,
                search_result: Ok(SearchResult::default()),
                stats: Ok(IndexStats::default()),
                next_task_uid: 1,
            }),
        }
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake index lock")
    }

    pub(crate) fn script_tasks(&self, statuses: impl IntoIterator<Item = TaskStatus>) {
        self.state()
            .task_script
            .extend(statuses.into_iter().map(Ok));
    }
}

#[async_trait]
impl SearchIndex for FakeIndex {
    async fn add_documents(
        &self,
        documents: &[Record],
        primary_key: &str,
    ) -> Result<TaskInfo, IndexError> {
        let mut state = self.state();
        let batch = state.uploads.len() + 1;
        state.uploads.push(UploadCall {
            documents: documents.to_vec(),
            primary_key: primary_key.to_string(),
            at: Instant::now(),
        });
        if state.reject_upload == Some(batch) {
            return Err(IndexError::Backend("payload too large".into()));
        }
        let task_uid = state.next_task_uid;
        state.next_task_uid += 1;
        Ok(TaskInfo {
            task_uid,
            status: TaskStatus::Enqueued,
        })
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, IndexError> {
        let mut state = self.state();
        state.searches.push(query.clone());
        state.search_result.clone().map_err(IndexError::Backend)
    }

    async fn get_stats(&self) -> Result<IndexStats, IndexError> {
        self.state().stats.clone().map_err(IndexError::Backend)
    }

    async fn get_task(&self, task_uid: u64) -> Result<Task, IndexError> {
        let mut state = self.state();
        state.task_queries.push(task_uid);
        let status = match state.task_script.pop_front() {
            Some(scripted) => scripted.map_err(IndexError::Backend)?,
            None => state.steady_status,
        };
        let error = (status == TaskStatus::Failed).then(|| crate::index::TaskError {
            message: "index rejected documents".into(),
            code: "invalid_document_fields".into(),
            ..Default::default()
        });
        Ok(Task {
            uid: task_uid,
            status,
            error,
        })
    }

    async fn health(&self) -> Result<(), IndexError> {
        Ok(())
    }

    async fn update_settings(&self, settings: &IndexSettings) -> Result<TaskInfo, IndexError> {
        let mut state = self.state();
        state.settings.push(settings.clone());
        let task_uid = state.next_task_uid;
        state.next_task_uid += 1;
        Ok(TaskInfo {
            task_uid,
            status: TaskStatus::Enqueued,
        })
    }
}
