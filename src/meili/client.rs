//! HTTP client wrapper for interacting with Meilisearch.

use crate::config::Config;
use crate::index::{
    IndexError, IndexSettings, IndexStats, Record, SearchIndex, SearchQuery, SearchResult, Task,
    TaskInfo,
};
use crate::meili::types::{
    EnqueuedTask, MeiliError, SearchBody, SearchResponse, StatsResponse, TaskView,
};
use async_trait::async_trait;
use reqwest::{Client, Method};

/// Lightweight HTTP client bound to a single Meilisearch index.
pub struct MeiliService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) index_uid: String,
}

impl MeiliService {
    /// Construct a client from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, MeiliError> {
        let client = Client::builder()
            .user_agent("catalog-search/0.1")
            .timeout(config.meili_timeout)
            .build()?;

        let base_url = normalize_base_url(&config.meili_url).map_err(MeiliError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            index = %config.meili_index,
            has_api_key = config
                .meili_master_key
                .as_deref()
                .is_some_and(|value| !value.is_empty()),
            "Initialized Meilisearch HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.meili_master_key.clone(),
            index_uid: config.meili_index.clone(),
        })
    }

    /// Uid of the index this client targets.
    pub fn index_uid(&self) -> &str {
        &self.index_uid
    }

    async fn enqueue_documents(
        &self,
        documents: &[Record],
        primary_key: &str,
    ) -> Result<TaskInfo, MeiliError> {
        let response = self
            .request(
                Method::POST,
                &format!("indexes/{}/documents", self.index_uid),
            )
            .query(&[("primaryKey", primary_key)])
            .json(documents)
            .send()
            .await?;
        let response = self.check(response, "Document upload failed").await?;
        let EnqueuedTask { task_uid, status } = response.json().await?;
        tracing::debug!(
            index = %self.index_uid,
            documents = documents.len(),
            task_uid,
            "Documents enqueued"
        );
        Ok(TaskInfo { task_uid, status })
    }

    async fn run_search(&self, query: &SearchQuery) -> Result<SearchResult, MeiliError> {
        let body = SearchBody {
            q: &query.query,
            limit: query.limit,
            offset: query.offset,
            filter: query.filter.as_deref(),
            sort: (!query.sort.is_empty()).then_some(query.sort.as_slice()),
        };
        let response = self
            .request(Method::POST, &format!("indexes/{}/search", self.index_uid))
            .json(&body)
            .send()
            .await?;
        let response = self.check(response, "Meilisearch search failed").await?;
        let payload: SearchResponse = response.json().await?;
        let total_hits = payload
            .estimated_total_hits
            .or(payload.total_hits)
            .unwrap_or(payload.hits.len() as u64);
        Ok(SearchResult {
            hits: payload.hits,
            total_hits,
            processing_time_ms: payload.processing_time_ms,
        })
    }

    async fn fetch_stats(&self) -> Result<IndexStats, MeiliError> {
        let response = self
            .request(Method::GET, &format!("indexes/{}/stats", self.index_uid))
            .send()
            .await?;
        let response = self.check(response, "Failed to fetch index stats").await?;
        let StatsResponse {
            number_of_documents,
            is_indexing,
        } = response.json().await?;
        Ok(IndexStats {
            number_of_documents,
            is_indexing,
        })
    }

    async fn fetch_task(&self, task_uid: u64) -> Result<Task, MeiliError> {
        let response = self
            .request(Method::GET, &format!("tasks/{task_uid}"))
            .send()
            .await?;
        let response = self.check(response, "Failed to fetch task status").await?;
        let TaskView { uid, status, error } = response.json().await?;
        Ok(Task { uid, status, error })
    }

    async fn ping(&self) -> Result<(), MeiliError> {
        let response = self.request(Method::GET, "health").send().await?;
        self.check(response, "Meilisearch health check failed")
            .await
            .map(|_| ())
    }

    async fn patch_settings(&self, settings: &IndexSettings) -> Result<TaskInfo, MeiliError> {
        let response = self
            .request(
                Method::PATCH,
                &format!("indexes/{}/settings", self.index_uid),
            )
            .json(settings)
            .send()
            .await?;
        let response = self.check(response, "Failed to update index settings").await?;
        let EnqueuedTask { task_uid, status } = response.json().await?;
        tracing::debug!(index = %self.index_uid, task_uid, "Settings update enqueued");
        Ok(TaskInfo { task_uid, status })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.bearer_auth(api_key);
        }
        req
    }

    async fn check(
        &self,
        response: reqwest::Response,
        context: &'static str,
    ) -> Result<reqwest::Response, MeiliError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = MeiliError::UnexpectedStatus { status, body };
        tracing::error!(index = %self.index_uid, error = %error, "{context}");
        Err(error)
    }
}

#[async_trait]
impl SearchIndex for MeiliService {
    async fn add_documents(
        &self,
        documents: &[Record],
        primary_key: &str,
    ) -> Result<TaskInfo, IndexError> {
        Ok(self.enqueue_documents(documents, primary_key).await?)
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, IndexError> {
        Ok(self.run_search(query).await?)
    }

    async fn get_stats(&self) -> Result<IndexStats, IndexError> {
        Ok(self.fetch_stats().await?)
    }

    async fn get_task(&self, task_uid: u64) -> Result<Task, IndexError> {
        Ok(self.fetch_task(task_uid).await?)
    }

    async fn health(&self) -> Result<(), IndexError> {
        Ok(self.ping().await?)
    }

    async fn update_settings(&self, settings: &IndexSettings) -> Result<TaskInfo, IndexError> {
        Ok(self.patch_settings(settings).await?)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
