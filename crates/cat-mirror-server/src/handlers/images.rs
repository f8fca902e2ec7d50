use axum::Json;
use axum::extract::{Path, Query, State};
use cat_mirror::{BreedId, Image, ImageCategory};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryParams {
    pub limit: Option<u32>,
}

/// GET /api/images/category/{category}
///
/// The category name is case-insensitive. Unknown names are a 400.
pub async fn images_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<CategoryParams>,
) -> AppResult<Json<Vec<Image>>> {
    let category = category.parse::<ImageCategory>().map_err(|e| {
        tracing::warn!(%category, "rejected unknown image category");
        AppError::BadRequest(e.to_string())
    })?;

    let images = match params.limit {
        Some(limit) => {
            state
                .queries
                .list_images_by_category_limited(category, limit)
                .await?
        }
        None => state.queries.list_images_by_category(category).await?,
    };
    Ok(Json(images))
}

/// GET /api/images/breed/{breed_id}
pub async fn images_by_breed(
    State(state): State<AppState>,
    Path(breed_id): Path<String>,
) -> AppResult<Json<Vec<Image>>> {
    let images = state
        .queries
        .list_images_by_breed(&BreedId::new(breed_id))
        .await?;
    Ok(Json(images))
}
