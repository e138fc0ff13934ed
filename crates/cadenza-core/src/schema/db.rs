use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::model::{Track, TrackId};

use super::migrations::MIGRATIONS;

const TRACK_COLUMNS: &str = "track_id, artists, track_name, track_genre,
    danceability, energy, valence, tempo, acousticness, instrumentalness,
    liveness, loudness, popularity, explicit";

/// A database connection holding the persisted catalog.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Catalog persistence
impl Database {
    /// Replace the stored catalog with `catalog`, keeping its positions, and
    /// stamp it with the training run that produced it.
    pub fn replace_catalog(&self, catalog: &Catalog, run_id: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM tracks", [])?;
        tx.execute(
            "INSERT INTO catalog_meta (key, value) VALUES ('run_id', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [run_id],
        )?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO tracks (position, {TRACK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
            ))?;
            for (position, track) in catalog.iter() {
                stmt.execute(rusqlite::params![
                    position as i64,
                    track.track_id.as_str(),
                    track.artists,
                    track.track_name,
                    track.track_genre,
                    track.danceability,
                    track.energy,
                    track.valence,
                    track.tempo,
                    track.acousticness,
                    track.instrumentalness,
                    track.liveness,
                    track.loudness,
                    track.popularity,
                    i64::from(track.explicit),
                ])?;
            }
        }
        tx.commit()?;
        log::info!("Stored catalog of {} tracks", catalog.len());
        Ok(())
    }

    /// Load the catalog in position order.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks ORDER BY position"
        ))?;
        let tracks = stmt
            .query_map([], Self::row_to_track)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Catalog::new(tracks)
    }

    /// Run id written by the last `replace_catalog`, if any.
    pub fn run_id(&self) -> Result<Option<String>> {
        let run_id = self
            .conn
            .query_row(
                "SELECT value FROM catalog_meta WHERE key = 'run_id'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(run_id)
    }

    /// Number of stored tracks.
    pub fn track_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_track(row: &rusqlite::Row) -> rusqlite::Result<Track> {
        let explicit: i64 = row.get(13)?;
        Ok(Track {
            track_id: TrackId::new(row.get::<_, String>(0)?),
            artists: row.get(1)?,
            track_name: row.get(2)?,
            track_genre: row.get(3)?,
            danceability: row.get(4)?,
            energy: row.get(5)?,
            valence: row.get(6)?,
            tempo: row.get(7)?,
            acousticness: row.get(8)?,
            instrumentalness: row.get(9)?,
            liveness: row.get(10)?,
            loudness: row.get(11)?,
            popularity: row.get(12)?,
            explicit: explicit != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AudioFeature;

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            Track::new("z", "Aria", "Night Drive", "synthwave")
                .with_audio(AudioFeature::Tempo, 120.0)
                .with_audio(AudioFeature::Loudness, -6.0)
                .with_popularity(71.0)
                .with_explicit(true),
            Track::new("a", "Bo", "Slow Water", "ambient").with_popularity(12.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_migrations_applied() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as i64);
        assert_eq!(db.track_count().unwrap(), 0);
        assert_eq!(db.run_id().unwrap(), None);
    }

    #[test]
    fn test_catalog_round_trip_preserves_positions() {
        let db = Database::open_in_memory().unwrap();
        let catalog = sample_catalog();
        db.replace_catalog(&catalog, "run-1").unwrap();

        let loaded = db.load_catalog().unwrap();
        assert_eq!(loaded, catalog);
        // insertion order, not track_id order
        assert_eq!(loaded.get(0).unwrap().track_id.as_str(), "z");
        assert!(loaded.get(0).unwrap().explicit);
    }

    #[test]
    fn test_replace_catalog_overwrites_previous() {
        let db = Database::open_in_memory().unwrap();
        db.replace_catalog(&sample_catalog(), "run-1").unwrap();

        let smaller = Catalog::new(vec![Track::new("q", "Cy", "Only", "pop")]).unwrap();
        db.replace_catalog(&smaller, "run-2").unwrap();

        assert_eq!(db.track_count().unwrap(), 1);
        assert_eq!(db.load_catalog().unwrap(), smaller);
        assert_eq!(db.run_id().unwrap().as_deref(), Some("run-2"));
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let db = Database::open(&path).unwrap();
            db.replace_catalog(&sample_catalog(), "run-1").unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.track_count().unwrap(), 2);
        assert_eq!(db.run_id().unwrap().as_deref(), Some("run-1"));
    }
}
