use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::breed::{Breed, BreedId};
use crate::image::{Image, ImageCategory};

/// Threshold in days before a sync is considered stale.
pub const STALE_THRESHOLD_DAYS: u64 = 7;

const SECS_PER_DAY: u64 = 86_400;

/// Errors raised by the persistence layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Stored breeds.
#[async_trait::async_trait]
pub trait BreedRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Breed>, RepositoryError>;

    async fn find_by_id(&self, id: &BreedId) -> Result<Option<Breed>, RepositoryError>;

    /// Breeds whose temperament contains `fragment`, ignoring case.
    async fn find_by_temperament(&self, fragment: &str) -> Result<Vec<Breed>, RepositoryError>;

    /// Breeds whose origin equals `origin`, ignoring case.
    async fn find_by_origin(&self, origin: &str) -> Result<Vec<Breed>, RepositoryError>;

    /// Distinct non-null origins, sorted.
    async fn distinct_origins(&self) -> Result<Vec<String>, RepositoryError>;

    /// Distinct non-null temperament strings.
    async fn distinct_temperaments(&self) -> Result<Vec<String>, RepositoryError>;

    /// Insert or overwrite every breed in one unit. Either all rows are
    /// written or none are.
    async fn save_all(&self, breeds: &[Breed]) -> Result<(), RepositoryError>;

    /// Remove a breed together with its images. Returns whether it existed.
    async fn delete(&self, id: &BreedId) -> Result<bool, RepositoryError>;
}

/// Stored images.
#[async_trait::async_trait]
pub trait ImageRepository: Send + Sync {
    async fn find_by_category(&self, category: ImageCategory)
    -> Result<Vec<Image>, RepositoryError>;

    /// At most `limit` images of `category`, ordered by id.
    async fn find_by_category_limited(
        &self,
        category: ImageCategory,
        limit: u32,
    ) -> Result<Vec<Image>, RepositoryError>;

    async fn find_by_breed(&self, breed: &BreedId) -> Result<Vec<Image>, RepositoryError>;

    /// Insert or overwrite every image in one unit.
    async fn save_all(&self, images: &[Image]) -> Result<(), RepositoryError>;
}

/// The independently triggered synchronization operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncKind {
    Breeds,
    BreedImages,
    CategoryImages,
}

impl SyncKind {
    pub const ALL: [SyncKind; 3] = [Self::Breeds, Self::BreedImages, Self::CategoryImages];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breeds => "breeds",
            Self::BreedImages => "breed-images",
            Self::CategoryImages => "category-images",
        }
    }
}

impl fmt::Display for SyncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breeds" => Ok(Self::Breeds),
            "breed-images" => Ok(Self::BreedImages),
            "category-images" => Ok(Self::CategoryImages),
            other => Err(format!("unknown sync kind: {other}")),
        }
    }
}

/// How fresh the local mirror is for one sync kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SyncStatus {
    NeverSynced,
    Stale { days_old: u64 },
    Fresh { days_old: u64 },
}

impl SyncStatus {
    /// Classify a last-sync timestamp (epoch seconds) relative to `now`.
    pub fn from_timestamps(last_synced_at: Option<u64>, now: u64) -> Self {
        match last_synced_at {
            None => Self::NeverSynced,
            Some(then) => {
                let days_old = now.saturating_sub(then) / SECS_PER_DAY;
                if days_old >= STALE_THRESHOLD_DAYS {
                    Self::Stale { days_old }
                } else {
                    Self::Fresh { days_old }
                }
            }
        }
    }
}

/// Records when each sync kind last completed.
#[async_trait::async_trait]
pub trait SyncLog: Send + Sync {
    async fn record_sync(&self, kind: SyncKind, epoch_secs: u64) -> Result<(), RepositoryError>;

    async fn last_synced_at(&self, kind: SyncKind) -> Result<Option<u64>, RepositoryError>;

    async fn sync_status(&self, kind: SyncKind) -> Result<SyncStatus, RepositoryError> {
        let last = self.last_synced_at(kind).await?;
        Ok(SyncStatus::from_timestamps(last, now_epoch_secs()))
    }
}

pub fn now_epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
