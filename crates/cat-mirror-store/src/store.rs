use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use cat_mirror::{
    Breed, BreedId, BreedRepository, Image, ImageCategory, ImageId, ImageRepository,
    RepositoryError, SyncKind, SyncLog,
};
use rusqlite::types::Type;

use crate::schema;

const BREED_COLUMNS: &str = "breed_id, name, temperament, origin, description, life_span,
     wikipedia_url, reference_image_id";

const IMAGE_COLUMNS: &str = "image_id, url, width, height, category, breed_id";

/// A SQLite-backed store for breeds, images and sync times.
pub struct SqliteStore {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn =
            rusqlite::Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        tracing::info!(path = %path.display(), "opened catalog database");
        Self::init(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Self::init(conn)
    }

    fn init(mut conn: rusqlite::Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StoreError::Database(e.to_string()))?;

        schema::migrations()
            .to_latest(&mut conn)
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Database("connection lock poisoned".into()))
    }

    fn query_breeds(
        &self,
        filter: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Breed>, RepositoryError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {BREED_COLUMNS} FROM breeds {filter} ORDER BY breed_id");
        let mut stmt = conn.prepare(&sql).map_err(db_error)?;

        stmt.query_map(params, row_to_breed)
            .map_err(db_error)?
            .collect::<Result<_, _>>()
            .map_err(db_error)
    }

    fn query_images(
        &self,
        filter: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Image>, RepositoryError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {IMAGE_COLUMNS} FROM images {filter}");
        let mut stmt = conn.prepare(&sql).map_err(db_error)?;

        stmt.query_map(params, row_to_image)
            .map_err(db_error)?
            .collect::<Result<_, _>>()
            .map_err(db_error)
    }

    fn query_strings(&self, sql: &str) -> Result<Vec<String>, RepositoryError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql).map_err(db_error)?;

        stmt.query_map([], |row| row.get(0))
            .map_err(db_error)?
            .collect::<Result<_, _>>()
            .map_err(db_error)
    }
}

fn row_to_breed(row: &rusqlite::Row) -> rusqlite::Result<Breed> {
    let id: String = row.get(0)?;

    Ok(Breed {
        id: BreedId::new(id),
        name: row.get(1)?,
        temperament: row.get(2)?,
        origin: row.get(3)?,
        description: row.get(4)?,
        life_span: row.get(5)?,
        wikipedia_url: row.get(6)?,
        reference_image_id: row.get(7)?,
    })
}

fn row_to_image(row: &rusqlite::Row) -> rusqlite::Result<Image> {
    let id: String = row.get(0)?;
    let category_str: String = row.get(4)?;
    let breed_id: Option<String> = row.get(5)?;

    let category = category_str
        .parse::<ImageCategory>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Image {
        id: ImageId::new(id),
        url: row.get(1)?,
        width: row.get(2)?,
        height: row.get(3)?,
        category,
        breed_id: breed_id.map(BreedId::new),
    })
}

fn db_error(e: rusqlite::Error) -> RepositoryError {
    match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => RepositoryError::Constraint(e.to_string()),
        _ => RepositoryError::Database(e.to_string()),
    }
}

#[async_trait::async_trait]
impl BreedRepository for SqliteStore {
    async fn find_all(&self) -> Result<Vec<Breed>, RepositoryError> {
        self.query_breeds("", [])
    }

    async fn find_by_id(&self, id: &BreedId) -> Result<Option<Breed>, RepositoryError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {BREED_COLUMNS} FROM breeds WHERE breed_id = ?1");

        match conn.query_row(&sql, [id.as_str()], row_to_breed) {
            Ok(breed) => Ok(Some(breed)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(other) => Err(db_error(other)),
        }
    }

    async fn find_by_temperament(&self, fragment: &str) -> Result<Vec<Breed>, RepositoryError> {
        // SQLite's lower() only folds ASCII, so matching happens here.
        let needle = fragment.to_lowercase();
        let breeds = self.query_breeds("WHERE temperament IS NOT NULL", [])?;

        Ok(breeds
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
        let breeds = self.query_breeds("WHERE origin IS NOT NULL", [])?;

        Ok(breeds
            .into_iter()
            .filter(|b| b.origin.as_ref().is_some_and(|o| o.to_lowercase() == needle))
            .collect())
    }

    async fn distinct_origins(&self) -> Result<Vec<String>, RepositoryError> {
        self.query_strings(
            "SELECT DISTINCT origin FROM breeds WHERE origin IS NOT NULL ORDER BY origin",
        )
    }

    async fn distinct_temperaments(&self) -> Result<Vec<String>, RepositoryError> {
        self.query_strings(
            "SELECT DISTINCT temperament FROM breeds
             WHERE temperament IS NOT NULL
             ORDER BY temperament",
        )
    }

    async fn save_all(&self, breeds: &[Breed]) -> Result<(), RepositoryError> {
        for breed in breeds {
            breed.validate()?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_error)?;
        {
            // Upsert in place: a replace would delete the row and cascade
            // away the breed's images.
            let mut stmt = tx
                .prepare(
                    "INSERT INTO breeds
                        (breed_id, name, temperament, origin, description, life_span,
                         wikipedia_url, reference_image_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(breed_id) DO UPDATE SET
                        name = excluded.name,
                        temperament = excluded.temperament,
                        origin = excluded.origin,
                        description = excluded.description,
                        life_span = excluded.life_span,
                        wikipedia_url = excluded.wikipedia_url,
                        reference_image_id = excluded.reference_image_id",
                )
                .map_err(db_error)?;

            for breed in breeds {
                stmt.execute(rusqlite::params![
                    breed.id.as_str(),
                    breed.name,
                    breed.temperament,
                    breed.origin,
                    breed.description,
                    breed.life_span,
                    breed.wikipedia_url,
                    breed.reference_image_id,
                ])
                .map_err(db_error)?;
            }
        }
        tx.commit().map_err(db_error)?;

        tracing::debug!(count = breeds.len(), "saved breeds");
        Ok(())
    }

    async fn delete(&self, id: &BreedId) -> Result<bool, RepositoryError> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM breeds WHERE breed_id = ?1", [id.as_str()])
            .map_err(db_error)?;
        Ok(removed > 0)
    }
}

#[async_trait::async_trait]
impl ImageRepository for SqliteStore {
    async fn find_by_category(
        &self,
        category: ImageCategory,
    ) -> Result<Vec<Image>, RepositoryError> {
        self.query_images("WHERE category = ?1 ORDER BY image_id", [category.as_str()])
    }

    async fn find_by_category_limited(
        &self,
        category: ImageCategory,
        limit: u32,
    ) -> Result<Vec<Image>, RepositoryError> {
        self.query_images(
            "WHERE category = ?1 ORDER BY image_id LIMIT ?2",
            rusqlite::params![category.as_str(), limit],
        )
    }

    async fn find_by_breed(&self, breed: &BreedId) -> Result<Vec<Image>, RepositoryError> {
        self.query_images("WHERE breed_id = ?1 ORDER BY image_id", [breed.as_str()])
    }

    async fn save_all(&self, images: &[Image]) -> Result<(), RepositoryError> {
        for image in images {
            image.validate()?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_error)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO images (image_id, url, width, height, category, breed_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(image_id) DO UPDATE SET
                        url = excluded.url,
                        width = excluded.width,
                        height = excluded.height,
                        category = excluded.category,
                        breed_id = excluded.breed_id",
                )
                .map_err(db_error)?;

            for image in images {
                stmt.execute(rusqlite::params![
                    image.id.as_str(),
                    image.url,
                    image.width,
                    image.height,
                    image.category.as_str(),
                    image.breed_id.as_ref().map(BreedId::as_str),
                ])
                .map_err(db_error)?;
            }
        }
        tx.commit().map_err(db_error)?;

        tracing::debug!(count = images.len(), "saved images");
        Ok(())
    }
}

#[async_trait::async_trait]
impl SyncLog for SqliteStore {
    async fn record_sync(&self, kind: SyncKind, epoch_secs: u64) -> Result<(), RepositoryError> {
        let at = i64::try_from(epoch_secs).map_err(|_| {
            RepositoryError::Database(format!("sync time out of range: {epoch_secs}"))
        })?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sync_runs (kind, last_synced_at) VALUES (?1, ?2)
             ON CONFLICT(kind) DO UPDATE SET last_synced_at = excluded.last_synced_at",
            rusqlite::params![kind.as_str(), at],
        )
        .map_err(db_error)?;
        Ok(())
    }

    async fn last_synced_at(&self, kind: SyncKind) -> Result<Option<u64>, RepositoryError> {
        let conn = self.conn()?;

        match conn.query_row(
            "SELECT last_synced_at FROM sync_runs WHERE kind = ?1",
            [kind.as_str()],
            |row| row.get::<_, i64>(0),
        ) {
            Ok(at) => u64::try_from(at).map(Some).map_err(|_| {
                RepositoryError::Database(format!("stored sync time out of range: {at}"))
            }),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(other) => Err(db_error(other)),
        }
    }
}

/// Errors raised while opening or migrating the database.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("migration error: {0}")]
    Migration(String),
}
