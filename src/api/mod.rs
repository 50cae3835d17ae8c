//! HTTP surface for the product catalog.
//!
//! - `GET /` – Static API description.
//! - `GET /health` – Liveness payload; never calls the search engine.
//! - `GET /api/products/search?q=&limit=&offset=` – Full-text search. Optional `category`,
//!   `status`, `sort_by`, and `sort_order` narrow and order the results.
//! - `GET /api/products/?id=` – Single product by integer id.
//! - `GET /api/products/stats` – Document count and indexing flag.
//!
//! Every response except `/` is wrapped in [`Envelope`]. CORS headers are attached to all
//! responses and `OPTIONS` requests are answered with `200` before routing.

pub mod envelope;
pub mod products;

pub use envelope::{ApiError, Envelope};

use crate::index::SearchIndex;
use axum::{
    Json, Router,
    extract::{ConnectInfo, Request},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Build the HTTP router over a shared search index handle.
pub fn create_router<S>(index: Arc<S>) -> Router
where
    S: SearchIndex + ?Sized + 'static,
{
    Router::new()
        .route("/", get(api_info))
        .route("/health", get(products::health_check))
        .route("/api/products/search", get(products::search_products::<S>))
        .route("/api/products/stats", get(products::get_index_stats::<S>))
        .route("/api/products/", get(products::get_product_by_id::<S>))
        .route("/api/products", get(products::get_product_by_id::<S>))
        .fallback(route_not_found)
        .with_state(index)
        .layer(middleware::from_fn(cors))
        .layer(middleware::from_fn(log_requests))
}

/// Static description of the API.
async fn api_info() -> Json<Value> {
    Json(json!({
        "message": "Meilisearch Product Catalog API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "search": "/api/products/search?q=<query>",
            "product": "/api/products?id=<id>",
            "stats": "/api/products/stats",
            "health": "/health"
        }
    }))
}

async fn route_not_found() -> ApiError {
    ApiError::route_not_found()
}

async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".into());
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        path = %path,
        remote = %remote,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );
    response
}
