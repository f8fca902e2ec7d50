//! In-memory collaborators for exercising synchronizers and queries without
//! a network or a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use crate::{
    Breed, BreedId, BreedRecord, BreedRepository, CatalogClient, Image, ImageCategory,
    ImageRecord, ImageRepository, RepositoryError, SyncKind, SyncLog, UpstreamError,
};

/// Canned upstream responses keyed by breed id or category code.
#[derive(Default)]
pub struct StubCatalogClient {
    breeds: Vec<BreedRecord>,
    breeds_failure: Option<String>,
    breed_images: HashMap<String, Result<Vec<ImageRecord>, String>>,
    breed_delays: HashMap<String, Duration>,
    category_images: HashMap<u32, Result<Vec<ImageRecord>, String>>,
    breed_image_limits: Mutex<Vec<u32>>,
}

impl StubCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_breeds(mut self, breeds: Vec<BreedRecord>) -> Self {
        self.breeds = breeds;
        self
    }

    pub fn failing_breeds(mut self, message: &str) -> Self {
        self.breeds_failure = Some(message.to_owned());
        self
    }

    pub fn with_breed_images(mut self, breed: &str, images: Vec<ImageRecord>) -> Self {
        self.breed_images.insert(breed.to_owned(), Ok(images));
        self
    }

    pub fn failing_breed_images(mut self, breed: &str, message: &str) -> Self {
        self.breed_images
            .insert(breed.to_owned(), Err(message.to_owned()));
        self
    }

    /// Delay the image response for one breed, to force out-of-order
    /// completion.
    pub fn with_breed_delay(mut self, breed: &str, delay: Duration) -> Self {
        self.breed_delays.insert(breed.to_owned(), delay);
        self
    }

    pub fn with_category_images(mut self, code: u32, images: Vec<ImageRecord>) -> Self {
        self.category_images.insert(code, Ok(images));
        self
    }

    pub fn failing_category(mut self, code: u32, message: &str) -> Self {
        self.category_images.insert(code, Err(message.to_owned()));
        self
    }

    /// Limits passed to `fetch_images_for_breed`, in call order.
    pub fn breed_image_limits(&self) -> Vec<u32> {
        self.breed_image_limits.lock().unwrap().clone()
    }
}

fn stub_error(message: &str) -> UpstreamError {
    UpstreamError::Status {
        status: 500,
        message: message.to_owned(),
    }
}

#[async_trait::async_trait]
impl CatalogClient for StubCatalogClient {
    async fn fetch_all_breeds(&self) -> Result<Vec<BreedRecord>, UpstreamError> {
        match &self.breeds_failure {
            Some(message) => Err(stub_error(message)),
            None => Ok(self.breeds.clone()),
        }
    }

    async fn fetch_images_for_breed(
        &self,
        breed: &BreedId,
        limit: u32,
    ) -> Result<Vec<ImageRecord>, UpstreamError> {
        self.breed_image_limits.lock().unwrap().push(limit);

        if let Some(delay) = self.breed_delays.get(breed.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        match self.breed_images.get(breed.as_str()) {
            Some(Ok(images)) => Ok(images.iter().take(limit as usize).cloned().collect()),
            Some(Err(message)) => Err(stub_error(message)),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_images_for_category(
        &self,
        category_code: u32,
        limit: u32,
    ) -> Result<Vec<ImageRecord>, UpstreamError> {
        match self.category_images.get(&category_code) {
            Some(Ok(images)) => Ok(images.iter().take(limit as usize).cloned().collect()),
            Some(Err(message)) => Err(stub_error(message)),
            None => Ok(Vec::new()),
        }
    }
}

/// Breeds, images and sync times held in ordered maps, with the same
/// overwrite-by-id and cascade semantics as the SQLite store.
#[derive(Default)]
pub struct InMemoryStore {
    breeds: Mutex<BTreeMap<BreedId, Breed>>,
    images: Mutex<BTreeMap<String, Image>>,
    synced: Mutex<HashMap<SyncKind, u64>>,
    write_failure: Mutex<Option<String>>,
    save_calls: Mutex<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save_all` fail with `message`.
    pub fn fail_writes(&self, message: &str) {
        *self.write_failure.lock().unwrap() = Some(message.to_owned());
    }

    /// Number of `save_all` calls that reached the store.
    pub fn save_calls(&self) -> usize {
        *self.save_calls.lock().unwrap()
    }

    /// Seed breeds that only carry an id and a name.
    pub fn insert_breeds<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        let mut breeds = self.breeds.lock().unwrap();
        for id in ids {
            breeds.insert(BreedId::new(id), Breed::new(id, id.to_uppercase()));
        }
    }

    pub fn insert_breed(&self, breed: Breed) {
        self.breeds.lock().unwrap().insert(breed.id.clone(), breed);
    }

    pub fn insert_image(&self, image: Image) {
        self.images
            .lock()
            .unwrap()
            .insert(image.id.to_string(), image);
    }

    pub fn breeds(&self) -> Vec<Breed> {
        self.breeds.lock().unwrap().values().cloned().collect()
    }

    pub fn all_images(&self) -> Vec<Image> {
        self.images.lock().unwrap().values().cloned().collect()
    }

    pub fn images_of(&self, breed: &str) -> Vec<Image> {
        self.all_images()
            .into_iter()
            .filter(|i| i.breed_id.as_ref().is_some_and(|b| b.as_str() == breed))
            .collect()
    }

    pub fn images_in(&self, category: ImageCategory) -> Vec<Image> {
        self.all_images()
            .into_iter()
            .filter(|i| i.category == category)
            .collect()
    }

    fn begin_write(&self) -> Result<(), RepositoryError> {
        *self.save_calls.lock().unwrap() += 1;
        match self.write_failure.lock().unwrap().as_ref() {
            Some(message) => Err(RepositoryError::Database(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl BreedRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Breed>, RepositoryError> {
        Ok(self.breeds())
    }

    async fn find_by_id(&self, id: &BreedId) -> Result<Option<Breed>, RepositoryError> {
        Ok(self.breeds.lock().unwrap().get(id).cloned())
    }

    async fn find_by_temperament(&self, fragment: &str) -> Result<Vec<Breed>, RepositoryError> {
        let needle = fragment.to_lowercase();
        Ok(self
            .breeds()
            .into_iter()
            .filter(|b| {
                b.temperament
                    .as_ref()
                    .is_some_and(|t| t.to_lowercase().contains(&needle))
            })
            .collect())
    }

    async fn find_by_origin(&self, origin: &str) -> Result<Vec<Breed>, RepositoryError> {
        let needle = origin.to_lowercase();
        Ok(self
            .breeds()
            .into_iter()
            .filter(|b| b.origin.as_ref().is_some_and(|o| o.to_lowercase() == needle))
            .collect())
    }

    async fn distinct_origins(&self) -> Result<Vec<String>, RepositoryError> {
        let mut origins: Vec<String> = self.breeds().into_iter().filter_map(|b| b.origin).collect();
        origins.sort();
        origins.dedup();
        Ok(origins)
    }

    async fn distinct_temperaments(&self) -> Result<Vec<String>, RepositoryError> {
        let mut temperaments: Vec<String> = self
            .breeds()
            .into_iter()
            .filter_map(|b| b.temperament)
            .collect();
        temperaments.sort();
        temperaments.dedup();
        Ok(temperaments)
    }

    async fn save_all(&self, breeds: &[Breed]) -> Result<(), RepositoryError> {
        self.begin_write()?;
        for breed in breeds {
            breed.validate()?;
        }

        let mut stored = self.breeds.lock().unwrap();
        for breed in breeds {
            stored.insert(breed.id.clone(), breed.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: &BreedId) -> Result<bool, RepositoryError> {
        let existed = self.breeds.lock().unwrap().remove(id).is_some();
        self.images
            .lock()
            .unwrap()
            .retain(|_, image| image.breed_id.as_ref() != Some(id));
        Ok(existed)
    }
}

#[async_trait::async_trait]
impl ImageRepository for InMemoryStore {
    async fn find_by_category(
        &self,
        category: ImageCategory,
    ) -> Result<Vec<Image>, RepositoryError> {
        Ok(self.images_in(category))
    }

    async fn find_by_category_limited(
        &self,
        category: ImageCategory,
        limit: u32,
    ) -> Result<Vec<Image>, RepositoryError> {
        Ok(self
            .images_in(category)
            .into_iter()
            .take(limit as usize)
            .collect())
    }

    async fn find_by_breed(&self, breed: &BreedId) -> Result<Vec<Image>, RepositoryError> {
        Ok(self.images_of(breed.as_str()))
    }

    async fn save_all(&self, images: &[Image]) -> Result<(), RepositoryError> {
        self.begin_write()?;
        for image in images {
            image.validate()?;
        }

        let mut stored = self.images.lock().unwrap();
        for image in images {
            stored.insert(image.id.to_string(), image.clone());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SyncLog for InMemoryStore {
    async fn record_sync(&self, kind: SyncKind, epoch_secs: u64) -> Result<(), RepositoryError> {
        self.synced.lock().unwrap().insert(kind, epoch_secs);
        Ok(())
    }

    async fn last_synced_at(&self, kind: SyncKind) -> Result<Option<u64>, RepositoryError> {
        Ok(self.synced.lock().unwrap().get(&kind).copied())
    }
}
