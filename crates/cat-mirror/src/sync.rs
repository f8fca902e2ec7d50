//! Pull data from the upstream catalog and persist it locally.
//!
//! Breeds are written as one bulk unit. Images fan out: one task per breed
//! (or per special category), each persisting its own batch as soon as its
//! fetch completes, all joined before the operation reports.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::breed::BreedId;
use crate::image::ImageCategory;
use crate::mapper;
use crate::repository::{
    BreedRepository, ImageRepository, RepositoryError, SyncKind, SyncLog, now_epoch_secs,
};
use crate::upstream::{CatalogClient, UpstreamError};

/// Errors that can occur during sync operations.
///
/// Upstream and storage failures carry the underlying message unchanged.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Storage(#[from] RepositoryError),

    #[error("sync task failed: {0}")]
    Task(String),
}

/// Summary of a successful sync operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Records written (inserted or overwritten).
    pub saved: u64,
}

/// Per-request result counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    pub images_per_breed: u32,
    pub images_per_category: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            images_per_breed: 3,
            images_per_category: 3,
        }
    }
}

/// Mirrors the upstream breed list.
pub struct BreedSynchronizer {
    client: Arc<dyn CatalogClient>,
    breeds: Arc<dyn BreedRepository>,
    log: Arc<dyn SyncLog>,
}

impl BreedSynchronizer {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        breeds: Arc<dyn BreedRepository>,
        log: Arc<dyn SyncLog>,
    ) -> Self {
        Self {
            client,
            breeds,
            log,
        }
    }

    /// Fetch every breed, map, and write them in one unit.
    ///
    /// A failed fetch writes nothing. A failed write fails the whole call.
    pub async fn sync_all_breeds(&self) -> Result<SyncReport, SyncError> {
        tracing::info!("starting breed sync");

        let records = self.client.fetch_all_breeds().await?;
        let breeds: Vec<_> = records.into_iter().map(mapper::to_breed).collect();

        tracing::debug!(count = breeds.len(), "saving breeds");
        self.breeds.save_all(&breeds).await?;
        self.log
            .record_sync(SyncKind::Breeds, now_epoch_secs())
            .await?;

        tracing::info!(saved = breeds.len(), "breed sync completed");
        Ok(SyncReport {
            saved: breeds.len() as u64,
        })
    }
}

/// Mirrors images for every stored breed and for the special categories.
pub struct ImageSynchronizer {
    client: Arc<dyn CatalogClient>,
    breeds: Arc<dyn BreedRepository>,
    images: Arc<dyn ImageRepository>,
    log: Arc<dyn SyncLog>,
    settings: SyncSettings,
}

impl ImageSynchronizer {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        breeds: Arc<dyn BreedRepository>,
        images: Arc<dyn ImageRepository>,
        log: Arc<dyn SyncLog>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            client,
            breeds,
            images,
            log,
            settings,
        }
    }

    /// Fetch and persist up to `images_per_breed` images for each stored
    /// breed, one concurrent unit per breed.
    ///
    /// Batches that completed stay persisted when another unit fails; the
    /// first failure is returned once every unit has finished.
    pub async fn sync_breed_images(&self) -> Result<SyncReport, SyncError> {
        tracing::info!("starting breed image sync");

        let breeds = self.breeds.find_all().await?;
        let limit = self.settings.images_per_breed;
        let mut units = JoinSet::new();

        for breed in breeds {
            let client = Arc::clone(&self.client);
            let images = Arc::clone(&self.images);

            units.spawn(async move {
                let result =
                    save_breed_images(client.as_ref(), images.as_ref(), &breed.id, limit).await;
                (SyncUnit::Breed(breed.id), result)
            });
        }

        let saved = join_units(units).await?;
        self.log
            .record_sync(SyncKind::BreedImages, now_epoch_secs())
            .await?;

        tracing::info!(saved, "breed image sync completed");
        Ok(SyncReport { saved })
    }

    /// Fetch and persist up to `images_per_category` images for hats and
    /// sunglasses concurrently. Neither image references a breed.
    pub async fn sync_category_images(&self) -> Result<SyncReport, SyncError> {
        tracing::info!("starting category image sync");

        let limit = self.settings.images_per_category;
        let mut units = JoinSet::new();

        for (category, code) in ImageCategory::SPECIAL {
            let client = Arc::clone(&self.client);
            let images = Arc::clone(&self.images);

            units.spawn(async move {
                let result =
                    save_category_images(client.as_ref(), images.as_ref(), category, code, limit)
                        .await;
                (SyncUnit::Category(category), result)
            });
        }

        let saved = join_units(units).await?;
        self.log
            .record_sync(SyncKind::CategoryImages, now_epoch_secs())
            .await?;

        tracing::info!(saved, "category image sync completed");
        Ok(SyncReport { saved })
    }
}

/// One independently completing branch of a fan-out.
#[derive(Debug)]
enum SyncUnit {
    Breed(BreedId),
    Category(ImageCategory),
}

impl fmt::Display for SyncUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Breed(id) => write!(f, "breed {id}"),
            Self::Category(category) => write!(f, "category {category}"),
        }
    }
}

async fn save_breed_images(
    client: &dyn CatalogClient,
    images: &dyn ImageRepository,
    breed: &BreedId,
    limit: u32,
) -> Result<u64, SyncError> {
    let records = client.fetch_images_for_breed(breed, limit).await?;
    let batch: Vec<_> = records
        .into_iter()
        .map(|record| mapper::to_image(record, ImageCategory::Breed, Some(breed)))
        .collect();

    tracing::debug!(breed = %breed, count = batch.len(), "saving breed images");
    images.save_all(&batch).await?;
    Ok(batch.len() as u64)
}

async fn save_category_images(
    client: &dyn CatalogClient,
    images: &dyn ImageRepository,
    category: ImageCategory,
    code: u32,
    limit: u32,
) -> Result<u64, SyncError> {
    let records = client.fetch_images_for_category(code, limit).await?;
    let batch: Vec<_> = records
        .into_iter()
        .map(|record| mapper::to_image(record, category, None))
        .collect();

    tracing::debug!(%category, count = batch.len(), "saving category images");
    images.save_all(&batch).await?;
    Ok(batch.len() as u64)
}

/// Wait for every unit. Sums the records saved, or returns the first
/// failure in completion order after all units have finished.
async fn join_units(
    mut units: JoinSet<(SyncUnit, Result<u64, SyncError>)>,
) -> Result<u64, SyncError> {
    let total = units.len();
    let mut saved = 0u64;
    let mut failed = 0usize;
    let mut first_failure = None;

    while let Some(joined) = units.join_next().await {
        let error = match joined {
            Ok((_, Ok(count))) => {
                saved += count;
                continue;
            }
            Ok((unit, Err(e))) => {
                tracing::warn!(%unit, error = %e, "sync unit failed");
                e
            }
            Err(e) => {
                tracing::warn!(error = %e, "sync unit aborted");
                SyncError::Task(e.to_string())
            }
        };

        failed += 1;
        first_failure.get_or_insert(error);
    }

    match first_failure {
        Some(error) => {
            tracing::error!(failed, total, saved, "sync finished with failures");
            Err(error)
        }
        None => Ok(saved),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::image::Image;
    use crate::record::{BreedRecord, ImageRecord};
    use crate::repository::SyncStatus;
    use crate::test_support::{InMemoryStore, StubCatalogClient};

    fn breed_record(id: &str, name: &str) -> BreedRecord {
        BreedRecord {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    fn image_record(id: &str) -> ImageRecord {
        ImageRecord {
            id: id.into(),
            url: format!("https://cdn2.thecatapi.com/images/{id}.jpg"),
            width: Some(800),
            height: Some(600),
            breeds: vec![],
        }
    }

    fn breed_sync(client: &Arc<StubCatalogClient>, store: &Arc<InMemoryStore>) -> BreedSynchronizer {
        BreedSynchronizer::new(client.clone(), store.clone(), store.clone())
    }

    fn image_sync(client: &Arc<StubCatalogClient>, store: &Arc<InMemoryStore>) -> ImageSynchronizer {
        ImageSynchronizer::new(
            client.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            SyncSettings::default(),
        )
    }

    #[tokio::test]
    async fn breed_sync_persists_all_breeds() {
        let client = Arc::new(
            StubCatalogClient::new()
                .with_breeds(vec![breed_record("abys", "Abyssinian"), breed_record("beng", "Bengal")]),
        );
        let store = Arc::new(InMemoryStore::new());

        let report = breed_sync(&client, &store).sync_all_breeds().await.unwrap();

        assert_eq!(report.saved, 2);
        let ids: Vec<String> = store.breeds().iter().map(|b| b.id.to_string()).collect();
        assert_eq!(ids, vec!["abys", "beng"]);
    }

    #[tokio::test]
    async fn breed_sync_is_idempotent() {
        let client = Arc::new(StubCatalogClient::new().with_breeds(vec![
            BreedRecord {
                temperament: Some("Active, Energetic".into()),
                ..breed_record("abys", "Abyssinian")
            },
        ]));
        let store = Arc::new(InMemoryStore::new());
        let sync = breed_sync(&client, &store);

        sync.sync_all_breeds().await.unwrap();
        let once = store.breeds();
        sync.sync_all_breeds().await.unwrap();

        assert_eq!(store.breeds(), once);
        assert_eq!(once.len(), 1);
    }

    #[tokio::test]
    async fn breed_sync_upstream_failure_writes_nothing() {
        let client = Arc::new(StubCatalogClient::new().failing_breeds("service unavailable"));
        let store = Arc::new(InMemoryStore::new());

        let err = breed_sync(&client, &store).sync_all_breeds().await.unwrap_err();

        assert!(matches!(err, SyncError::Upstream(_)));
        assert!(err.to_string().contains("service unavailable"));
        assert!(store.breeds().is_empty());
        assert_eq!(store.save_calls(), 0);
    }

    #[tokio::test]
    async fn breed_sync_storage_failure_propagates() {
        let client = Arc::new(StubCatalogClient::new().with_breeds(vec![breed_record("abys", "Abyssinian")]));
        let store = Arc::new(InMemoryStore::new());
        store.fail_writes("disk full");

        let err = breed_sync(&client, &store).sync_all_breeds().await.unwrap_err();

        assert!(matches!(err, SyncError::Storage(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn breed_sync_records_sync_time() {
        let client = Arc::new(StubCatalogClient::new());
        let store = Arc::new(InMemoryStore::new());

        assert_eq!(
            store.sync_status(SyncKind::Breeds).await.unwrap(),
            SyncStatus::NeverSynced
        );

        breed_sync(&client, &store).sync_all_breeds().await.unwrap();

        assert_eq!(
            store.sync_status(SyncKind::Breeds).await.unwrap(),
            SyncStatus::Fresh { days_old: 0 }
        );
    }

    #[tokio::test]
    async fn breed_images_are_saved_for_every_breed_out_of_order() {
        let client = Arc::new(
            StubCatalogClient::new()
                .with_breed_images("abys", vec![image_record("a1"), image_record("a2")])
                .with_breed_images("beng", vec![image_record("b1")])
                .with_breed_images("siam", vec![image_record("s1"), image_record("s2"), image_record("s3")])
                .with_breed_delay("abys", Duration::from_millis(50)),
        );
        let store = Arc::new(InMemoryStore::new());
        store.insert_breeds(["abys", "beng", "siam"]);

        let report = image_sync(&client, &store).sync_breed_images().await.unwrap();

        assert_eq!(report.saved, 6);
        assert_eq!(store.images_of("abys").len(), 2);
        assert_eq!(store.images_of("beng").len(), 1);
        assert_eq!(store.images_of("siam").len(), 3);
        assert_eq!(client.breed_image_limits(), vec![3, 3, 3]);
    }

    #[tokio::test]
    async fn breed_image_failure_keeps_other_batches() {
        let client = Arc::new(
            StubCatalogClient::new()
                .with_breed_images("abys", vec![image_record("a1")])
                .with_breed_images("siam", vec![image_record("s1")])
                .failing_breed_images("beng", "breed lookup failed"),
        );
        let store = Arc::new(InMemoryStore::new());
        store.insert_breeds(["abys", "beng", "siam"]);

        let err = image_sync(&client, &store).sync_breed_images().await.unwrap_err();

        assert!(err.to_string().contains("breed lookup failed"));
        assert_eq!(store.images_of("abys").len(), 1);
        assert_eq!(store.images_of("siam").len(), 1);
        assert!(store.images_of("beng").is_empty());
        assert_eq!(
            store.sync_status(SyncKind::BreedImages).await.unwrap(),
            SyncStatus::NeverSynced
        );
    }

    #[tokio::test]
    async fn breed_images_with_no_breeds_is_a_no_op() {
        let client = Arc::new(StubCatalogClient::new());
        let store = Arc::new(InMemoryStore::new());

        let report = image_sync(&client, &store).sync_breed_images().await.unwrap();

        assert_eq!(report.saved, 0);
        assert!(client.breed_image_limits().is_empty());
    }

    #[tokio::test]
    async fn category_images_are_tagged_without_breed() {
        let client = Arc::new(
            StubCatalogClient::new()
                .with_category_images(1, vec![image_record("h1"), image_record("h2")])
                .with_category_images(4, vec![image_record("g1")]),
        );
        let store = Arc::new(InMemoryStore::new());

        let report = image_sync(&client, &store)
            .sync_category_images()
            .await
            .unwrap();

        assert_eq!(report.saved, 3);
        let hats = store.images_in(ImageCategory::Hats);
        let sunglasses = store.images_in(ImageCategory::Sunglasses);
        assert_eq!(hats.len(), 2);
        assert_eq!(sunglasses.len(), 1);
        assert!(hats.iter().chain(&sunglasses).all(|i: &Image| i.breed_id.is_none()));
    }

    #[tokio::test]
    async fn category_failure_is_reported_after_other_category_saves() {
        let client = Arc::new(
            StubCatalogClient::new()
                .with_category_images(1, vec![image_record("h1")])
                .failing_category(4, "sunglasses unavailable"),
        );
        let store = Arc::new(InMemoryStore::new());

        let err = image_sync(&client, &store)
            .sync_category_images()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("sunglasses unavailable"));
        assert_eq!(store.images_in(ImageCategory::Hats).len(), 1);
    }

    #[tokio::test]
    async fn persisted_images_respect_category_breed_exclusivity() {
        let client = Arc::new(
            StubCatalogClient::new()
                .with_breed_images("abys", vec![image_record("a1")])
                .with_category_images(1, vec![image_record("h1")])
                .with_category_images(4, vec![image_record("g1")]),
        );
        let store = Arc::new(InMemoryStore::new());
        store.insert_breeds(["abys"]);
        let sync = image_sync(&client, &store);

        sync.sync_breed_images().await.unwrap();
        sync.sync_category_images().await.unwrap();

        for image in store.all_images() {
            assert_eq!(
                image.category == ImageCategory::Breed,
                image.breed_id.is_some(),
                "image {} violates exclusivity",
                image.id
            );
        }
    }
}
