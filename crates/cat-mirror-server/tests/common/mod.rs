#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use cat_mirror::test_support::{InMemoryStore, StubCatalogClient};
use cat_mirror::{Breed, BreedId, Image, ImageCategory, ImageId, SyncSettings};
use cat_mirror_server::router::build_app_router;
use cat_mirror_server::state::AppState;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Build the full application router over an in-memory store and a stub
/// upstream.
pub fn build_test_app(client: StubCatalogClient, store: Arc<InMemoryStore>) -> Router {
    let state = AppState::new(Arc::new(client), store, SyncSettings::default());
    build_app_router(state)
}

/// A store holding two breeds, two breed images and one hat image.
pub fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.insert_breed(Breed {
        temperament: Some("Active, Energetic, Independent".into()),
        origin: Some("Egypt".into()),
        ..Breed::new("abys", "Abyssinian")
    });
    store.insert_breed(Breed {
        temperament: Some("Alert, Agile, Energetic".into()),
        origin: Some("United States".into()),
        ..Breed::new("beng", "Bengal")
    });
    store.insert_image(image("a1", ImageCategory::Breed, Some("abys")));
    store.insert_image(image("a2", ImageCategory::Breed, Some("abys")));
    store.insert_image(image("h1", ImageCategory::Hats, None));
    store
}

pub fn image(id: &str, category: ImageCategory, breed: Option<&str>) -> Image {
    Image {
        id: ImageId::new(id),
        url: format!("https://cdn2.thecatapi.com/images/{id}.jpg"),
        width: Some(800),
        height: Some(600),
        category,
        breed_id: breed.map(BreedId::new),
    }
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::post(uri).body(Body::empty()).unwrap()).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
