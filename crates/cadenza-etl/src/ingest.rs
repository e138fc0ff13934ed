use std::path::{Path, PathBuf};
use treadle::{Stage, StageContext, StageOutcome};
use uuid::Uuid;

use crate::artifacts::ArtifactStore;
use crate::error::TrainError;
use crate::loader::{load_catalog, LoadReport};

/// Load and clean the dataset, then persist it as the catalog artifact.
///
/// Each ingest starts a new training run; the catalog is stamped with its id
/// and later stages carry it forward.
pub fn ingest(data_path: &Path, store: &ArtifactStore) -> Result<LoadReport, TrainError> {
    let loaded = load_catalog(data_path)?;
    let run_id = Uuid::new_v4();
    store.save_catalog(&loaded.catalog, run_id)?;
    log::info!(
        "Ingested {} tracks into {} (run {run_id})",
        loaded.report.kept,
        store.dir().display()
    );
    Ok(loaded.report)
}

/// The Ingest stage: CSV in, `catalog.db` out.
#[derive(Debug)]
pub struct IngestStage {
    data_path: PathBuf,
    store: ArtifactStore,
}

impl IngestStage {
    #[must_use]
    pub fn new(data_path: PathBuf, store: ArtifactStore) -> Self {
        Self { data_path, store }
    }
}

#[async_trait::async_trait]
impl Stage for IngestStage {
    fn name(&self) -> &str {
        "ingest"
    }

    async fn execute(
        &self,
        _item: &dyn treadle::WorkItem,
        ctx: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        log::info!("Starting ingest of {}", self.data_path.display());

        let report = ingest(&self.data_path, &self.store).map_err(|e| {
            treadle::TreadleError::StageExecution(format!("Ingest failed: {e}"))
        })?;

        let report_json = serde_json::to_value(report).map_err(|e| {
            treadle::TreadleError::StageExecution(format!("Failed to serialize load report: {e}"))
        })?;
        ctx.metadata.insert("load_report".to_string(), report_json);

        Ok(StageOutcome::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CSV: &str = "\
track_id,artists,track_name,track_genre,danceability,energy,valence,tempo,acousticness,instrumentalness,liveness,loudness,popularity,explicit
t1,Aria,Night Drive,synthwave,0.5,0.7,0.4,120,0.1,0.0,0.2,-6,70,False
t1,Aria,Night Drive,synthwave,0.5,0.7,0.4,120,0.1,0.0,0.2,-6,70,False
t2,Bo,Slow Water,ambient,0.2,0.1,0.3,80,0.9,0.8,0.1,-18,20,False
";

    #[test]
    fn test_ingest_writes_catalog() {
        let dir = TempDir::new().unwrap();
        let data_path = dir.path().join("dataset.csv");
        fs::write(&data_path, CSV).unwrap();
        let store = ArtifactStore::new(dir.path().join("models"));

        let report = ingest(&data_path, &store).unwrap();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.dropped_duplicates, 1);
        assert_eq!(store.load_catalog().unwrap().len(), 2);
        assert!(store.catalog_run_id().is_ok());
    }

    #[test]
    fn test_each_ingest_starts_a_new_run() {
        let dir = TempDir::new().unwrap();
        let data_path = dir.path().join("dataset.csv");
        fs::write(&data_path, CSV).unwrap();
        let store = ArtifactStore::new(dir.path().join("models"));

        ingest(&data_path, &store).unwrap();
        let first = store.catalog_run_id().unwrap();
        ingest(&data_path, &store).unwrap();
        assert_ne!(store.catalog_run_id().unwrap(), first);
    }

    #[test]
    fn test_ingest_missing_dataset() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let err = ingest(&dir.path().join("nope.csv"), &store).unwrap_err();
        assert!(matches!(err, TrainError::Load(_)));
        assert!(store.missing_files().contains(&"catalog.db".to_string()));
    }

    #[tokio::test]
    async fn test_ingest_stage_records_report() {
        let dir = TempDir::new().unwrap();
        let data_path = dir.path().join("dataset.csv");
        fs::write(&data_path, CSV).unwrap();

        let stage = IngestStage::new(data_path.clone(), ArtifactStore::new(dir.path()));
        let job = crate::TrainingJob::new("train-job", data_path);
        let mut ctx = StageContext::new("ingest".to_string());

        let outcome = stage.execute(&job, &mut ctx).await.unwrap();
        assert_eq!(outcome, StageOutcome::Complete);
        let report = ctx.metadata.get("load_report").unwrap();
        assert_eq!(report["kept"], serde_json::json!(2));
    }
}
