//! Product endpoints: search, lookup by id, index stats, and health.

use super::envelope::{ApiError, Envelope};
use crate::index::{IndexStats, Record, SearchIndex, SearchQuery};
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Page size used when `limit` is absent or not positive.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

const PRODUCT_ID_FIELD: &str = "id";
const CATEGORY_FIELD: &str = "category_name";
const STATUS_FIELD: &str = "status";

/// Raw query string of `GET /api/products/search`.
///
/// Numeric parameters stay strings so that garbage falls back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
    category: Option<String>,
    status: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

/// `data` of a successful search.
#[derive(Debug, Serialize)]
pub struct ProductSearchResponse {
    hits: Vec<Record>,
    total_hits: u64,
    processing_time_ms: u64,
    query: String,
    limit: usize,
    offset: usize,
}

/// Query string of `GET /api/products/`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductIdParams {
    id: Option<String>,
}

/// `data` of the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    status: &'static str,
    service: &'static str,
}

/// Full-text product search.
pub async fn search_products<S>(
    State(index): State<Arc<S>>,
    Query(params): Query<SearchParams>,
) -> Result<Envelope<ProductSearchResponse>, ApiError>
where
    S: SearchIndex + ?Sized,
{
    let query = build_search_query(params)?;
    let result = index.search(&query).await.map_err(|err| {
        tracing::error!(query = %query.query, error = %err, "Search failed");
        ApiError::search_failed()
    })?;
    tracing::debug!(
        query = %query.query,
        hits = result.hits.len(),
        total_hits = result.total_hits,
        "Search completed"
    );

    Ok(Envelope::success(
        "Search completed successfully",
        ProductSearchResponse {
            hits: result.hits,
            total_hits: result.total_hits,
            processing_time_ms: result.processing_time_ms,
            query: query.query,
            limit: query.limit,
            offset: query.offset,
        },
    ))
}

/// Look up a single product by its integer id.
pub async fn get_product_by_id<S>(
    State(index): State<Arc<S>>,
    Query(params): Query<ProductIdParams>,
) -> Result<Envelope<Record>, ApiError>
where
    S: SearchIndex + ?Sized,
{
    let id = parse_product_id(params.id.as_deref())?;

    let query = SearchQuery::new("", 1, 0).with_filter(format!("{PRODUCT_ID_FIELD} = {id}"));
    let result = index.search(&query).await.map_err(|err| {
        tracing::error!(id, error = %err, "Product lookup failed");
        ApiError::search_failed()
    })?;

    let product = result
        .hits
        .into_iter()
        .next()
        .ok_or(ApiError::product_not_found())?;
    Ok(Envelope::success("Product retrieved successfully", product))
}

/// Document count and indexing flag.
pub async fn get_index_stats<S>(
    State(index): State<Arc<S>>,
) -> Result<Envelope<IndexStats>, ApiError>
where
    S: SearchIndex + ?Sized,
{
    let stats = index.get_stats().await.map_err(|err| {
        tracing::error!(error = %err, "Stats request failed");
        ApiError::stats_failed()
    })?;
    Ok(Envelope::success(
        "Index statistics retrieved successfully",
        stats,
    ))
}

/// Static liveness payload; does not touch the search engine.
pub async fn health_check() -> Envelope<HealthStatus> {
    Envelope::success(
        "Service is healthy",
        HealthStatus {
            status: "ok",
            service: "product-catalog",
        },
    )
}

fn build_search_query(params: SearchParams) -> Result<SearchQuery, ApiError> {
    let SearchParams {
        q,
        limit,
        offset,
        category,
        status,
        sort_by,
        sort_order,
    } = params;

    let text = q
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::missing_query())?;
    let limit = limit
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value > 0)
        .map_or(DEFAULT_SEARCH_LIMIT, |value| value as usize);
    let offset = offset
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value >= 0)
        .map_or(0, |value| value as usize);

    let clauses: Vec<String> = [(CATEGORY_FIELD, category), (STATUS_FIELD, status)]
        .into_iter()
        .filter_map(|(field, value)| {
            let value = value?;
            let value = value.trim();
            (!value.is_empty()).then(|| format!("{field} = {}", quote_filter_value(value)))
        })
        .collect();

    let mut query = SearchQuery::new(text, limit, offset);
    if !clauses.is_empty() {
        query = query.with_filter(clauses.join(" AND "));
    }
    if let Some(rule) = sort_rule(sort_by, sort_order)? {
        query = query.with_sort(vec![rule]);
    }
    Ok(query)
}

/// Only the empty string counts as missing; anything else must be a plain integer.
fn parse_product_id(raw: Option<&str>) -> Result<i64, ApiError> {
    let raw = raw
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::missing_id())?;
    raw.parse().map_err(|_| ApiError::invalid_id())
}

fn sort_rule(
    sort_by: Option<String>,
    sort_order: Option<String>,
) -> Result<Option<String>, ApiError> {
    let Some(field) = sort_by
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    else {
        return Ok(None);
    };
    let valid = field
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.');
    if !valid {
        return Err(ApiError::invalid_sort());
    }
    let descending = sort_order.is_some_and(|order| order.trim().eq_ignore_ascii_case("desc"));
    let order = if descending { "desc" } else { "asc" };
    Ok(Some(format!("{field}:{order}")))
}

fn quote_filter_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
