//! Read-only breed endpoints.

use axum::Json;
use axum::extract::{Path, State};
use cat_mirror::{Breed, BreedId};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/breeds
pub async fn list_breeds(State(state): State<AppState>) -> AppResult<Json<Vec<Breed>>> {
    let breeds = state.queries.list_all_breeds().await?;
    tracing::info!(count = breeds.len(), "listed breeds");
    Ok(Json(breeds))
}

/// GET /api/breeds/{id}
///
/// Returns 404 when the breed has not been mirrored.
pub async fn get_breed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Breed>> {
    let id = BreedId::new(id);

    match state.queries.get_breed_by_id(&id).await? {
        Some(breed) => Ok(Json(breed)),
        None => {
            tracing::warn!(%id, "breed not found");
            Err(AppError::NotFound(format!("breed {id} not found")))
        }
    }
}

/// GET /api/breeds/by-temperament/{temperament}
pub async fn breeds_by_temperament(
    State(state): State<AppState>,
    Path(temperament): Path<String>,
) -> AppResult<Json<Vec<Breed>>> {
    let breeds = state.queries.find_breeds_by_temperament(&temperament).await?;
    Ok(Json(breeds))
}

/// GET /api/breeds/by-origin/{origin}
pub async fn breeds_by_origin(
    State(state): State<AppState>,
    Path(origin): Path<String>,
) -> AppResult<Json<Vec<Breed>>> {
    let breeds = state.queries.find_breeds_by_origin(&origin).await?;
    Ok(Json(breeds))
}

/// GET /api/breeds/origins
pub async fn list_origins(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.queries.list_origins().await?))
}

/// GET /api/breeds/temperaments
pub async fn list_temperaments(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.queries.list_temperaments().await?))
}
