mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use cat_mirror::test_support::{InMemoryStore, StubCatalogClient};
use common::{build_test_app, get, seeded_store};

#[tokio::test]
async fn health_reports_ok() {
    let app = build_test_app(StubCatalogClient::new(), Arc::new(InMemoryStore::new()));

    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn list_breeds_returns_every_breed() {
    let app = build_test_app(StubCatalogClient::new(), seeded_store());

    let (status, body) = get(app, "/api/breeds").await;

    assert_eq!(status, StatusCode::OK);
    let breeds = body.as_array().unwrap();
    assert_eq!(breeds.len(), 2);
    assert_eq!(breeds[0]["id"], "abys");
    assert_eq!(breeds[0]["origin"], "Egypt");
}

#[tokio::test]
async fn empty_catalog_lists_no_breeds() {
    let app = build_test_app(StubCatalogClient::new(), Arc::new(InMemoryStore::new()));

    let (status, body) = get(app, "/api/breeds").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn get_breed_by_id_returns_breed() {
    let app = build_test_app(StubCatalogClient::new(), seeded_store());

    let (status, body) = get(app, "/api/breeds/beng").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Bengal");
    assert_eq!(body["temperament"], "Alert, Agile, Energetic");
}

#[tokio::test]
async fn unknown_breed_is_not_found() {
    let app = build_test_app(StubCatalogClient::new(), seeded_store());

    let (status, body) = get(app, "/api/breeds/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn temperament_search_ignores_case() {
    let app = build_test_app(StubCatalogClient::new(), seeded_store());

    let (status, body) = get(app, "/api/breeds/by-temperament/ENERGETIC").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn origin_search_requires_whole_value() {
    let app = build_test_app(StubCatalogClient::new(), seeded_store());

    let (_, exact) = get(app.clone(), "/api/breeds/by-origin/united%20states").await;
    assert_eq!(exact.as_array().unwrap().len(), 1);
    assert_eq!(exact[0]["id"], "beng");

    let (_, partial) = get(app, "/api/breeds/by-origin/United").await;
    assert!(partial.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn distinct_origins_and_temperaments() {
    let app = build_test_app(StubCatalogClient::new(), seeded_store());

    let (status, origins) = get(app.clone(), "/api/breeds/origins").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(origins, serde_json::json!(["Egypt", "United States"]));

    let (status, temperaments) = get(app, "/api/breeds/temperaments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(temperaments.as_array().unwrap().len(), 2);
}
