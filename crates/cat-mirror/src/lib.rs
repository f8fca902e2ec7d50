pub mod breed;
pub mod image;
pub mod mapper;
pub mod query;
pub mod record;
pub mod repository;
pub mod sync;
pub mod upstream;

pub use breed::{Breed, BreedId};
pub use image::{Image, ImageCategory, ImageId, UnknownCategory};
pub use query::{QueryError, QueryService};
pub use record::{BreedRecord, ImageRecord};
pub use repository::{
    BreedRepository, ImageRepository, RepositoryError, SyncKind, SyncLog, SyncStatus,
};
pub use sync::{BreedSynchronizer, ImageSynchronizer, SyncError, SyncReport, SyncSettings};
pub use upstream::{CatalogClient, UpstreamError};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
