use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{breeds, health, images, sync};
use crate::state::AppState;

/// Build the application router with every route and middleware layer.
pub fn build_app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(build_cors_layer())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/breeds", get(breeds::list_breeds))
        .route("/breeds/origins", get(breeds::list_origins))
        .route("/breeds/temperaments", get(breeds::list_temperaments))
        .route(
            "/breeds/by-temperament/{temperament}",
            get(breeds::breeds_by_temperament),
        )
        .route("/breeds/by-origin/{origin}", get(breeds::breeds_by_origin))
        .route("/breeds/collect", post(sync::collect_breeds))
        .route("/breeds/{id}", get(breeds::get_breed))
        .route(
            "/images/category/{category}",
            get(images::images_by_category),
        )
        .route("/images/breed/{breed_id}", get(images::images_by_breed))
        .route("/images/collect/breeds", post(sync::collect_breed_images))
        .route(
            "/images/collect/categories",
            post(sync::collect_category_images),
        )
        .route("/sync/status", get(sync::sync_status))
}

/// Any origin may call the API.
pub fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
