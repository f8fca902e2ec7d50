//! Sync triggers and sync freshness.
//!
//! Each trigger runs its operation to completion before answering.

use axum::Json;
use axum::extract::State;
use cat_mirror::{SyncError, SyncKind, SyncReport, SyncStatus};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: &'static str,
    pub saved: u64,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusEntry {
    pub kind: SyncKind,
    #[serde(flatten)]
    pub status: SyncStatus,
}

fn respond(
    result: Result<SyncReport, SyncError>,
    message: &'static str,
    failure: &str,
) -> AppResult<Json<SyncResponse>> {
    match result {
        Ok(report) => Ok(Json(SyncResponse {
            message,
            saved: report.saved,
        })),
        Err(e) => Err(AppError::SyncFailed(format!("{failure}: {e}"))),
    }
}

/// POST /api/breeds/collect
pub async fn collect_breeds(State(state): State<AppState>) -> AppResult<Json<SyncResponse>> {
    respond(
        state.breed_sync.sync_all_breeds().await,
        "Breeds collected successfully",
        "Error collecting breeds",
    )
}

/// POST /api/images/collect/breeds
pub async fn collect_breed_images(
    State(state): State<AppState>,
) -> AppResult<Json<SyncResponse>> {
    respond(
        state.image_sync.sync_breed_images().await,
        "Breed images collected successfully",
        "Error collecting breed images",
    )
}

/// POST /api/images/collect/categories
pub async fn collect_category_images(
    State(state): State<AppState>,
) -> AppResult<Json<SyncResponse>> {
    respond(
        state.image_sync.sync_category_images().await,
        "Category images collected successfully",
        "Error collecting category images",
    )
}

/// GET /api/sync/status
pub async fn sync_status(State(state): State<AppState>) -> AppResult<Json<Vec<SyncStatusEntry>>> {
    let statuses = state
        .queries
        .sync_statuses()
        .await?
        .into_iter()
        .map(|(kind, status)| SyncStatusEntry { kind, status })
        .collect();
    Ok(Json(statuses))
}
