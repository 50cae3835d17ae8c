use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use catalogsearch::{api::create_router, config::Config, meili::MeiliService};
use httpmock::{
    Method::{GET, POST},
    MockServer,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn router(server: &MockServer) -> Router {
    let config = Config {
        meili_url: server.base_url(),
        meili_master_key: Some("search-key".into()),
        meili_index: "sku".into(),
        ..Config::default()
    };
    let service = MeiliService::from_config(&config).expect("client");
    create_router(Arc::new(service))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
        .await
        .expect("router response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, serde_json::from_slice(&body).expect("json body"))
}

#[tokio::test]
async fn search_forwards_query_and_returns_engine_hits() {
    let server = MockServer::start_async().await;
    let search = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/indexes/sku/search")
                .header("authorization", "Bearer search-key")
                .json_body(json!({
                    "q": "fevicol",
                    "limit": 2,
                    "offset": 4,
                    "filter": "category_name = \"Adhesives\"",
                    "sort": ["selling_price:desc"]
                }));
            then.status(200).json_body(json!({
                "hits": [
                    { "id": 11, "name": "FEVICOL SH" },
                    { "id": 12, "name": "FEVICOL MR" }
                ],
                "processingTimeMs": 3,
                "estimatedTotalHits": 57
            }));
        })
        .await;

    let (status, body) = get(
        router(&server),
        "/api/products/search?q=fevicol&limit=2&offset=4&category=Adhesives&sort_by=selling_price&sort_order=desc",
    )
    .await;

    search.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total_hits"], 57);
    assert_eq!(body["data"]["processing_time_ms"], 3);
    assert_eq!(body["data"]["hits"][1]["name"], "FEVICOL MR");
    assert_eq!(body["data"]["limit"], 2);
    assert_eq!(body["data"]["offset"], 4);
}

#[tokio::test]
async fn product_lookup_filters_by_id() {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/indexes/sku/search")
                .json_body(json!({ "q": "", "limit": 1, "offset": 0, "filter": "id = 42" }));
            then.status(200).json_body(json!({
                "hits": [{ "id": 42, "sku": "ADH42", "name": "FEVICOL 42" }],
                "processingTimeMs": 0,
                "estimatedTotalHits": 1
            }));
        })
        .await;

    let (status, body) = get(router(&server), "/api/products/?id=42").await;

    lookup.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product retrieved successfully");
    assert_eq!(body["data"]["sku"], "ADH42");
}

#[tokio::test]
async fn engine_outage_maps_to_search_failed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/indexes/sku/search");
            then.status(503).body("unavailable");
        })
        .await;

    let (status, body) = get(router(&server), "/api/products/search?q=tape").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "SEARCH_FAILED");
    assert_eq!(body["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn stats_reports_document_count() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/indexes/sku/stats");
            then.status(200).json_body(json!({
                "numberOfDocuments": 2500,
                "isIndexing": true,
                "fieldDistribution": { "id": 2500 }
            }));
        })
        .await;

    let (status, body) = get(router(&server), "/api/products/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["number_of_documents"], 2500);
    assert_eq!(body["data"]["is_indexing"], true);
}

#[tokio::test]
async fn health_does_not_touch_the_engine() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(500);
        })
        .await;

    let (status, body) = get(router(&server), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    any.assert_hits_async(0).await;
}
