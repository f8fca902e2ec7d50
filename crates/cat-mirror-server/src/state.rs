use std::sync::Arc;

use cat_mirror::{
    BreedRepository, BreedSynchronizer, CatalogClient, ImageRepository, ImageSynchronizer,
    QueryService, SyncLog, SyncSettings,
};

/// Shared application state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub queries: QueryService,
    pub breed_sync: Arc<BreedSynchronizer>,
    pub image_sync: Arc<ImageSynchronizer>,
}

impl AppState {
    /// Wire the services over one store that backs every repository.
    pub fn new<S>(client: Arc<dyn CatalogClient>, store: Arc<S>, settings: SyncSettings) -> Self
    where
        S: BreedRepository + ImageRepository + SyncLog + 'static,
    {
        let breed_sync = BreedSynchronizer::new(client.clone(), store.clone(), store.clone());
        let image_sync = ImageSynchronizer::new(
            client,
            store.clone(),
            store.clone(),
            store.clone(),
            settings,
        );

        Self {
            queries: QueryService::new(store.clone(), store.clone(), store),
            breed_sync: Arc::new(breed_sync),
            image_sync: Arc::new(image_sync),
        }
    }
}
