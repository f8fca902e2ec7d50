use std::sync::Arc;

use crate::breed::{Breed, BreedId};
use crate::image::{Image, ImageCategory};
use crate::repository::{
    BreedRepository, ImageRepository, RepositoryError, SyncKind, SyncLog, SyncStatus,
};

/// A lookup failed because the store could not be read. A missing record
/// is never an error; it is returned as `None` or an empty list.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Read-only lookups over the mirrored catalog.
#[derive(Clone)]
pub struct QueryService {
    breeds: Arc<dyn BreedRepository>,
    images: Arc<dyn ImageRepository>,
    log: Arc<dyn SyncLog>,
}

impl QueryService {
    pub fn new(
        breeds: Arc<dyn BreedRepository>,
        images: Arc<dyn ImageRepository>,
        log: Arc<dyn SyncLog>,
    ) -> Self {
        Self {
            breeds,
            images,
            log,
        }
    }

    pub async fn list_all_breeds(&self) -> Result<Vec<Breed>, QueryError> {
        tracing::debug!("listing all breeds");
        Ok(self.breeds.find_all().await?)
    }

    pub async fn get_breed_by_id(&self, id: &BreedId) -> Result<Option<Breed>, QueryError> {
        tracing::debug!(%id, "fetching breed");
        Ok(self.breeds.find_by_id(id).await?)
    }

    /// Case-insensitive substring match on temperament.
    pub async fn find_breeds_by_temperament(
        &self,
        fragment: &str,
    ) -> Result<Vec<Breed>, QueryError> {
        tracing::debug!(temperament = fragment, "finding breeds by temperament");
        Ok(self.breeds.find_by_temperament(fragment).await?)
    }

    /// Case-insensitive exact match on origin.
    pub async fn find_breeds_by_origin(&self, origin: &str) -> Result<Vec<Breed>, QueryError> {
        tracing::debug!(origin, "finding breeds by origin");
        Ok(self.breeds.find_by_origin(origin).await?)
    }

    pub async fn list_origins(&self) -> Result<Vec<String>, QueryError> {
        Ok(self.breeds.distinct_origins().await?)
    }

    pub async fn list_temperaments(&self) -> Result<Vec<String>, QueryError> {
        Ok(self.breeds.distinct_temperaments().await?)
    }

    pub async fn list_images_by_category(
        &self,
        category: ImageCategory,
    ) -> Result<Vec<Image>, QueryError> {
        tracing::debug!(%category, "listing images by category");
        Ok(self.images.find_by_category(category).await?)
    }

    pub async fn list_images_by_category_limited(
        &self,
        category: ImageCategory,
        limit: u32,
    ) -> Result<Vec<Image>, QueryError> {
        tracing::debug!(%category, limit, "listing images by category");
        Ok(self.images.find_by_category_limited(category, limit).await?)
    }

    pub async fn list_images_by_breed(&self, breed: &BreedId) -> Result<Vec<Image>, QueryError> {
        tracing::debug!(%breed, "listing images by breed");
        Ok(self.images.find_by_breed(breed).await?)
    }

    /// Freshness of every sync kind, in declaration order.
    pub async fn sync_statuses(&self) -> Result<Vec<(SyncKind, SyncStatus)>, QueryError> {
        let mut statuses = Vec::with_capacity(SyncKind::ALL.len());
        for kind in SyncKind::ALL {
            statuses.push((kind, self.log.sync_status(kind).await?));
        }
        Ok(statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageId;
    use crate::test_support::InMemoryStore;

    fn service(store: &Arc<InMemoryStore>) -> QueryService {
        QueryService::new(store.clone(), store.clone(), store.clone())
    }

    fn seeded_store() -> Arc<InMemoryStore> {
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
        store.insert_breed(Breed::new("mau", "Egyptian Mau"));
        store
    }

    fn image(id: &str, category: ImageCategory, breed: Option<&str>) -> Image {
        Image {
            id: ImageId::new(id),
            url: format!("https://cdn2.thecatapi.com/images/{id}.jpg"),
            width: None,
            height: None,
            category,
            breed_id: breed.map(BreedId::new),
        }
    }

    #[tokio::test]
    async fn temperament_search_is_case_insensitive_substring() {
        let store = seeded_store();

        let breeds = service(&store)
            .find_breeds_by_temperament("active")
            .await
            .unwrap();

        assert_eq!(breeds.len(), 1);
        assert_eq!(breeds[0].id.as_str(), "abys");

        let energetic = service(&store)
            .find_breeds_by_temperament("ENERGETIC")
            .await
            .unwrap();
        assert_eq!(energetic.len(), 2);
    }

    #[tokio::test]
    async fn origin_search_is_case_insensitive_exact() {
        let store = seeded_store();
        let queries = service(&store);

        let egypt = queries.find_breeds_by_origin("EGYPT").await.unwrap();
        assert_eq!(egypt.len(), 1);
        assert_eq!(egypt[0].name, "Abyssinian");

        let partial = queries.find_breeds_by_origin("Egy").await.unwrap();
        assert!(partial.is_empty());
    }

    #[tokio::test]
    async fn missing_breed_is_absent_not_an_error() {
        let store = seeded_store();

        let breed = service(&store)
            .get_breed_by_id(&BreedId::new("nonexistent"))
            .await
            .unwrap();

        assert!(breed.is_none());
    }

    #[tokio::test]
    async fn distinct_origins_skip_missing_values() {
        let store = seeded_store();

        let origins = service(&store).list_origins().await.unwrap();

        assert_eq!(origins, vec!["Egypt", "United States"]);
    }

    #[tokio::test]
    async fn images_filtered_by_category_and_breed() {
        let store = seeded_store();
        store.insert_image(image("a1", ImageCategory::Breed, Some("abys")));
        store.insert_image(image("h1", ImageCategory::Hats, None));
        store.insert_image(image("h2", ImageCategory::Hats, None));
        let queries = service(&store);

        let hats = queries
            .list_images_by_category(ImageCategory::Hats)
            .await
            .unwrap();
        assert_eq!(hats.len(), 2);

        let one_hat = queries
            .list_images_by_category_limited(ImageCategory::Hats, 1)
            .await
            .unwrap();
        assert_eq!(one_hat.len(), 1);
        assert_eq!(one_hat[0].id.as_str(), "h1");

        let abys = queries
            .list_images_by_breed(&BreedId::new("abys"))
            .await
            .unwrap();
        assert_eq!(abys.len(), 1);
        assert_eq!(abys[0].category, ImageCategory::Breed);
    }

    #[tokio::test]
    async fn sync_statuses_cover_every_kind() {
        let store = seeded_store();
        store
            .record_sync(SyncKind::Breeds, crate::repository::now_epoch_secs())
            .await
            .unwrap();

        let statuses = service(&store).sync_statuses().await.unwrap();

        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[0], (SyncKind::Breeds, SyncStatus::Fresh { days_old: 0 }));
        assert_eq!(statuses[1], (SyncKind::BreedImages, SyncStatus::NeverSynced));
    }
}
