/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Catalog tracks. `position` is the row index into the feature matrix and
-- similarity index, so it is stored explicitly rather than relying on rowid.
CREATE TABLE IF NOT EXISTS tracks (
    position INTEGER PRIMARY KEY,
    track_id TEXT NOT NULL UNIQUE,
    artists TEXT NOT NULL,
    track_name TEXT NOT NULL,
    track_genre TEXT NOT NULL,
    danceability REAL NOT NULL,
    energy REAL NOT NULL,
    valence REAL NOT NULL,
    tempo REAL NOT NULL,
    acousticness REAL NOT NULL,
    instrumentalness REAL NOT NULL,
    liveness REAL NOT NULL,
    loudness REAL NOT NULL,
    popularity REAL NOT NULL,
    explicit INTEGER NOT NULL CHECK (explicit IN (0, 1))
);
"#;

const MIGRATION_002: &str = r#"
CREATE INDEX IF NOT EXISTS idx_tracks_genre ON tracks(track_genre);
CREATE INDEX IF NOT EXISTS idx_tracks_artists ON tracks(artists);
"#;

const MIGRATION_003: &str = r#"
-- Key/value stamps for the stored catalog, e.g. the training run id.
CREATE TABLE IF NOT EXISTS catalog_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: MIGRATION_001,
    },
    Migration {
        version: 2,
        name: "track_lookup_indices",
        sql: MIGRATION_002,
    },
    Migration {
        version: 3,
        name: "catalog_meta",
        sql: MIGRATION_003,
    },
];
