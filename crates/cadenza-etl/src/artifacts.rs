//! The artifact directory shared by training and serving.
//!
//! | file            | contents                                  |
//! |-----------------|-------------------------------------------|
//! | `catalog.db`    | SQLite catalog, positions preserved, run id stamp |
//! | `pipeline.json` | fitted feature pipeline and the run id it was fitted for |
//! | `index.json.gz` | similarity index with its feature matrix  |
//! | `manifest.json` | run id, timestamp, row and column counts  |
//!
//! JSON files are written to a temporary name and renamed into place so a
//! crashed run never leaves a half-written artifact behind. Every run id in
//! the directory must agree before serving will load it, so a run that
//! failed halfway is reported as corrupt instead of pairing new rows with an
//! old index.

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use cadenza_core::schema::Database;
use cadenza_core::{Catalog, FeaturePipeline};
use cadenza_search::SimilarityIndex;

use crate::error::{ArtifactError, ArtifactResult};

pub const CATALOG_FILE: &str = "catalog.db";
pub const PIPELINE_FILE: &str = "pipeline.json";
pub const INDEX_FILE: &str = "index.json.gz";
pub const MANIFEST_FILE: &str = "manifest.json";

const ALL_FILES: [&str; 4] = [CATALOG_FILE, PIPELINE_FILE, INDEX_FILE, MANIFEST_FILE];

/// Summary of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub track_count: usize,
    pub dimensions: usize,
    pub columns: Vec<String>,
}

impl Manifest {
    #[must_use]
    pub fn new(run_id: Uuid, track_count: usize, columns: Vec<String>) -> Self {
        Self {
            run_id,
            trained_at: Utc::now(),
            track_count,
            dimensions: columns.len(),
            columns,
        }
    }
}

/// A fitted pipeline together with the run whose catalog it was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampedPipeline {
    pub run_id: Uuid,
    pub pipeline: FeaturePipeline,
}

/// Everything serving needs, loaded and cross-checked.
#[derive(Debug)]
pub struct Artifacts {
    pub catalog: Catalog,
    pub pipeline: FeaturePipeline,
    pub index: SimilarityIndex,
    pub manifest: Manifest,
}

/// Reads and writes artifacts in one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_of(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Artifact files not present in the directory.
    #[must_use]
    pub fn missing_files(&self) -> Vec<String> {
        ALL_FILES
            .iter()
            .filter(|f| !self.path_of(f).is_file())
            .map(|f| (*f).to_string())
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_files().is_empty()
    }

    fn require(&self, file: &str) -> ArtifactResult<PathBuf> {
        let path = self.path_of(file);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ArtifactError::Missing {
                dir: self.dir.clone(),
                files: vec![file.to_string()],
            })
        }
    }

    fn ensure_dir(&self) -> ArtifactResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Load all artifacts and check that they describe the same catalog.
    ///
    /// # Errors
    /// `ArtifactError::Missing` if any file is absent, `ArtifactError::Corrupt`
    /// if a file cannot be parsed or row counts disagree.
    pub fn load(&self) -> ArtifactResult<Artifacts> {
        let missing = self.missing_files();
        if !missing.is_empty() {
            return Err(ArtifactError::Missing {
                dir: self.dir.clone(),
                files: missing,
            });
        }

        log::info!("Loading artifacts from {}", self.dir.display());
        let manifest = self.load_manifest()?;
        let catalog_run = self.catalog_run_id()?;
        let catalog = self.load_catalog()?;
        let StampedPipeline {
            run_id: pipeline_run,
            pipeline,
        } = self.load_pipeline()?;
        let index = self.load_index()?;

        if catalog_run != manifest.run_id {
            return Err(ArtifactError::corrupt(
                CATALOG_FILE,
                format!(
                    "catalog is from run {catalog_run} but the manifest is from run {}",
                    manifest.run_id
                ),
            ));
        }
        if pipeline_run != manifest.run_id {
            return Err(ArtifactError::corrupt(
                PIPELINE_FILE,
                format!(
                    "pipeline was fitted in run {pipeline_run} but the manifest is from run {}",
                    manifest.run_id
                ),
            ));
        }

        if catalog.len() != index.len() {
            return Err(ArtifactError::corrupt(
                INDEX_FILE,
                format!(
                    "index has {} rows but catalog has {} tracks",
                    index.len(),
                    catalog.len()
                ),
            ));
        }
        if manifest.track_count != catalog.len() {
            return Err(ArtifactError::corrupt(
                MANIFEST_FILE,
                format!(
                    "manifest records {} tracks but catalog has {}",
                    manifest.track_count,
                    catalog.len()
                ),
            ));
        }
        if pipeline.dimensions() != index.dimensions() {
            return Err(ArtifactError::corrupt(
                PIPELINE_FILE,
                format!(
                    "pipeline produces {} columns but index has {}",
                    pipeline.dimensions(),
                    index.dimensions()
                ),
            ));
        }

        log::info!(
            "Loaded {} tracks x {} features (run {})",
            catalog.len(),
            index.dimensions(),
            manifest.run_id
        );

        Ok(Artifacts {
            catalog,
            pipeline,
            index,
            manifest,
        })
    }

    // --- catalog ---

    pub fn save_catalog(&self, catalog: &Catalog, run_id: Uuid) -> ArtifactResult<()> {
        self.ensure_dir()?;
        let db = Database::open(self.path_of(CATALOG_FILE))?;
        db.replace_catalog(catalog, &run_id.to_string())?;
        Ok(())
    }

    /// Open the stored catalog database.
    pub fn open_catalog(&self) -> ArtifactResult<Database> {
        let path = self.require(CATALOG_FILE)?;
        Database::open(path).map_err(|e| ArtifactError::corrupt(CATALOG_FILE, e))
    }

    pub fn load_catalog(&self) -> ArtifactResult<Catalog> {
        self.open_catalog()?
            .load_catalog()
            .map_err(|e| ArtifactError::corrupt(CATALOG_FILE, e))
    }

    /// The run id stamped on the stored catalog.
    pub fn catalog_run_id(&self) -> ArtifactResult<Uuid> {
        let stamp = self
            .open_catalog()?
            .run_id()
            .map_err(|e| ArtifactError::corrupt(CATALOG_FILE, e))?
            .ok_or_else(|| ArtifactError::corrupt(CATALOG_FILE, "catalog has no run id"))?;
        Uuid::parse_str(&stamp).map_err(|e| ArtifactError::corrupt(CATALOG_FILE, e))
    }

    // --- pipeline ---

    pub fn save_pipeline(&self, pipeline: &StampedPipeline) -> ArtifactResult<()> {
        self.write_atomic(PIPELINE_FILE, |w| {
            serde_json::to_writer_pretty(w, pipeline)?;
            Ok(())
        })
    }

    pub fn load_pipeline(&self) -> ArtifactResult<StampedPipeline> {
        let path = self.require(PIPELINE_FILE)?;
        read_json(PIPELINE_FILE, BufReader::new(File::open(path)?))
    }

    // --- index ---

    pub fn save_index(&self, index: &SimilarityIndex) -> ArtifactResult<()> {
        self.write_atomic(INDEX_FILE, |w| {
            let mut encoder = GzEncoder::new(w, Compression::default());
            serde_json::to_writer(&mut encoder, index)?;
            encoder.finish()?;
            Ok(())
        })
    }

    pub fn load_index(&self) -> ArtifactResult<SimilarityIndex> {
        let path = self.require(INDEX_FILE)?;
        let decoder = GzDecoder::new(BufReader::new(File::open(path)?));
        read_json(INDEX_FILE, decoder)
    }

    // --- manifest ---

    pub fn save_manifest(&self, manifest: &Manifest) -> ArtifactResult<()> {
        self.write_atomic(MANIFEST_FILE, |w| {
            serde_json::to_writer_pretty(w, manifest)?;
            Ok(())
        })
    }

    pub fn load_manifest(&self) -> ArtifactResult<Manifest> {
        let path = self.require(MANIFEST_FILE)?;
        read_json(MANIFEST_FILE, BufReader::new(File::open(path)?))
    }

    fn write_atomic<F>(&self, file: &str, write: F) -> ArtifactResult<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> ArtifactResult<()>,
    {
        self.ensure_dir()?;
        let final_path = self.path_of(file);
        let tmp_path = self.path_of(&format!("{file}.tmp"));

        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        write(&mut writer)?;
        writer.flush()?;
        drop(writer);

        std::fs::rename(&tmp_path, &final_path)?;
        log::debug!("Wrote {}", final_path.display());
        Ok(())
    }
}

fn read_json<T: DeserializeOwned, R: Read>(file: &str, reader: R) -> ArtifactResult<T> {
    serde_json::from_reader(reader).map_err(|e| ArtifactError::corrupt(file, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_core::model::{AudioFeature, Track};
    use cadenza_core::FeatureWeights;
    use tempfile::TempDir;

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            Track::new("a", "Aria", "Night Drive", "synthwave")
                .with_audio(AudioFeature::Tempo, 120.0)
                .with_audio(AudioFeature::Loudness, -6.0),
            Track::new("b", "Bo", "Slow Water", "ambient")
                .with_audio(AudioFeature::Tempo, 80.0)
                .with_audio(AudioFeature::Loudness, -18.0),
        ])
        .unwrap()
    }

    fn write_all(store: &ArtifactStore, catalog: &Catalog) -> Uuid {
        let run_id = Uuid::new_v4();
        let (pipeline, matrix) =
            FeaturePipeline::fit_transform(catalog, FeatureWeights::default()).unwrap();
        let index = SimilarityIndex::build(matrix).unwrap();
        let columns = pipeline.column_names();
        store.save_catalog(catalog, run_id).unwrap();
        store
            .save_pipeline(&StampedPipeline { run_id, pipeline })
            .unwrap();
        store.save_index(&index).unwrap();
        store
            .save_manifest(&Manifest::new(run_id, catalog.len(), columns))
            .unwrap();
        run_id
    }

    #[test]
    fn test_empty_directory_is_missing_everything() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert_eq!(store.missing_files().len(), 4);

        let err = store.load().unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_nonexistent_directory_is_missing() {
        let store = ArtifactStore::new("/nonexistent/cadenza/models");
        assert!(store.load().unwrap_err().is_missing());
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("models"));
        let catalog = sample_catalog();
        write_all(&store, &catalog);

        assert!(store.is_complete());
        let artifacts = store.load().unwrap();
        assert_eq!(artifacts.catalog, catalog);
        assert_eq!(artifacts.index.len(), 2);
        assert_eq!(artifacts.manifest.track_count, 2);
        assert_eq!(artifacts.manifest.dimensions, artifacts.pipeline.dimensions());
        assert!(!dir.path().join("models").join("index.json.gz.tmp").exists());
    }

    #[test]
    fn test_incomplete_directory_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        write_all(&store, &sample_catalog());
        std::fs::remove_file(store.path_of(INDEX_FILE)).unwrap();

        match store.load().unwrap_err() {
            ArtifactError::Missing { files, .. } => assert_eq!(files, vec![INDEX_FILE]),
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_pipeline() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        write_all(&store, &sample_catalog());
        std::fs::write(store.path_of(PIPELINE_FILE), "{not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { ref file, .. } if file == PIPELINE_FILE));
    }

    #[test]
    fn test_row_count_mismatch_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        write_all(&store, &sample_catalog());

        let bigger = Catalog::new(vec![
            Track::new("a", "Aria", "Night Drive", "synthwave"),
            Track::new("b", "Bo", "Slow Water", "ambient"),
            Track::new("c", "Cy", "Third", "ambient"),
        ])
        .unwrap();
        let run_id = store.load_manifest().unwrap().run_id;
        store.save_catalog(&bigger, run_id).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { .. }));
        assert!(!err.is_missing());
    }

    #[test]
    fn test_inconsistent_index_matrix_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        write_all(&store, &sample_catalog());

        // rows and cols still match the catalog, but half the values are gone
        let file = File::create(store.path_of(INDEX_FILE)).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(br#"{"rows":2,"cols":12,"data":[1.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0]}"#)
            .unwrap();
        encoder.finish().unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { ref file, .. } if file == INDEX_FILE));
    }

    #[test]
    fn test_catalog_from_another_run_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let catalog = sample_catalog();
        write_all(&store, &catalog);

        // same shape, different run: an interrupted retrain
        store.save_catalog(&catalog, Uuid::new_v4()).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { ref file, .. } if file == CATALOG_FILE));
    }

    #[test]
    fn test_pipeline_from_another_run_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        write_all(&store, &sample_catalog());

        let mut stamped = store.load_pipeline().unwrap();
        stamped.run_id = Uuid::new_v4();
        store.save_pipeline(&stamped).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { ref file, .. } if file == PIPELINE_FILE));
    }

    #[test]
    fn test_catalog_run_id_matches_manifest() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let run_id = write_all(&store, &sample_catalog());

        assert_eq!(store.catalog_run_id().unwrap(), run_id);
        assert_eq!(store.load().unwrap().manifest.run_id, run_id);
        assert_eq!(store.open_catalog().unwrap().track_count().unwrap(), 2);
    }
}
