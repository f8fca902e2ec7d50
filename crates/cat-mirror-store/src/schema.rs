use rusqlite_migration::{M, Migrations};

pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "CREATE TABLE breeds (
            breed_id            TEXT PRIMARY KEY NOT NULL,
            name                TEXT NOT NULL,
            temperament         TEXT,
            origin              TEXT,
            description         TEXT,
            life_span           TEXT,
            wikipedia_url       TEXT,
            reference_image_id  TEXT
        );

        CREATE TABLE images (
            image_id    TEXT PRIMARY KEY NOT NULL,
            url         TEXT NOT NULL,
            width       INTEGER,
            height      INTEGER,
            category    TEXT NOT NULL CHECK (category IN ('BREED', 'HATS', 'SUNGLASSES')),
            breed_id    TEXT REFERENCES breeds(breed_id) ON DELETE CASCADE,
            CHECK ((category = 'BREED') = (breed_id IS NOT NULL))
        );

        CREATE TABLE sync_runs (
            kind            TEXT PRIMARY KEY NOT NULL,
            last_synced_at  INTEGER NOT NULL
        );

        CREATE INDEX idx_breeds_origin ON breeds(origin);
        CREATE INDEX idx_images_category ON images(category);
        CREATE INDEX idx_images_breed ON images(breed_id);",
    )])
}
