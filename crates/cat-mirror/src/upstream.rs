use std::sync::Arc;

use crate::breed::BreedId;
use crate::record::{BreedRecord, ImageRecord};

/// Errors returned by the upstream catalog provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),
}

/// Read-only access to the external cat catalog.
///
/// Implementations carry their credential from construction; callers never
/// pass one per request. A failed call is reported once and not retried.
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch the full breed list in one call.
    async fn fetch_all_breeds(&self) -> Result<Vec<BreedRecord>, UpstreamError>;

    /// Fetch up to `limit` images of the given breed.
    async fn fetch_images_for_breed(
        &self,
        breed: &BreedId,
        limit: u32,
    ) -> Result<Vec<ImageRecord>, UpstreamError>;

    /// Fetch up to `limit` images of the provider's numeric category.
    async fn fetch_images_for_category(
        &self,
        category_code: u32,
        limit: u32,
    ) -> Result<Vec<ImageRecord>, UpstreamError>;
}

#[async_trait::async_trait]
impl<T: CatalogClient + ?Sized> CatalogClient for Arc<T> {
    async fn fetch_all_breeds(&self) -> Result<Vec<BreedRecord>, UpstreamError> {
        (**self).fetch_all_breeds().await
    }

    async fn fetch_images_for_breed(
        &self,
        breed: &BreedId,
        limit: u32,
    ) -> Result<Vec<ImageRecord>, UpstreamError> {
        (**self).fetch_images_for_breed(breed, limit).await
    }

    async fn fetch_images_for_category(
        &self,
        category_code: u32,
        limit: u32,
    ) -> Result<Vec<ImageRecord>, UpstreamError> {
        (**self).fetch_images_for_category(category_code, limit).await
    }
}
