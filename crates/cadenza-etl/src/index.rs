use treadle::{Stage, StageContext, StageOutcome};

use cadenza_search::SimilarityIndex;

use crate::artifacts::{ArtifactStore, Manifest, StampedPipeline, PIPELINE_FILE};
use crate::error::ArtifactError;
use crate::error::TrainError;

/// Transform the stored catalog with the stored pipeline, build the
/// similarity index, and write it with a fresh manifest.
///
/// The pipeline is applied as saved, never refit, so serving sees exactly
/// the columns the index was built from. It must have been fitted on the
/// stored catalog's run.
pub fn build_index(store: &ArtifactStore) -> Result<Manifest, TrainError> {
    let run_id = store.catalog_run_id()?;
    let catalog = store.load_catalog()?;
    let StampedPipeline {
        run_id: pipeline_run,
        pipeline,
    } = store.load_pipeline()?;
    if pipeline_run != run_id {
        return Err(ArtifactError::corrupt(
            PIPELINE_FILE,
            format!("pipeline was fitted in run {pipeline_run} but the catalog is from run {run_id}"),
        )
        .into());
    }

    let matrix = pipeline.transform(&catalog)?;
    let index = SimilarityIndex::build(matrix)?;
    store.save_index(&index)?;

    let manifest = Manifest::new(run_id, catalog.len(), pipeline.column_names());
    store.save_manifest(&manifest)?;

    log::info!(
        "Indexed {} tracks x {} features (run {})",
        manifest.track_count,
        manifest.dimensions,
        manifest.run_id
    );
    Ok(manifest)
}

/// The Index stage: catalog + pipeline in, `index.json.gz` + `manifest.json` out.
#[derive(Debug)]
pub struct IndexStage {
    store: ArtifactStore,
}

impl IndexStage {
    #[must_use]
    pub fn new(store: ArtifactStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Stage for IndexStage {
    fn name(&self) -> &str {
        "index"
    }

    async fn execute(
        &self,
        _item: &dyn treadle::WorkItem,
        ctx: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        let manifest = build_index(&self.store).map_err(|e| {
            treadle::TreadleError::StageExecution(format!("Index build failed: {e}"))
        })?;

        ctx.metadata.insert(
            "run_id".to_string(),
            serde_json::Value::from(manifest.run_id.to_string()),
        );
        ctx.metadata.insert(
            "track_count".to_string(),
            serde_json::Value::from(manifest.track_count),
        );

        Ok(StageOutcome::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_core::model::{AudioFeature, Track};
    use cadenza_core::{Catalog, FeatureWeights};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn trained_store(dir: &TempDir) -> ArtifactStore {
        let store = ArtifactStore::new(dir.path());
        let catalog = Catalog::new(vec![
            Track::new("a", "Aria", "Night Drive", "synthwave")
                .with_audio(AudioFeature::Energy, 0.8),
            Track::new("b", "Bo", "Slow Water", "ambient").with_audio(AudioFeature::Energy, 0.1),
            Track::new("c", "Cy", "Neon", "synthwave").with_audio(AudioFeature::Energy, 0.7),
        ])
        .unwrap();
        store.save_catalog(&catalog, Uuid::new_v4()).unwrap();
        crate::featurize::featurize(&store, FeatureWeights::default()).unwrap();
        store
    }

    #[test]
    fn test_build_index_completes_artifacts() {
        let dir = TempDir::new().unwrap();
        let store = trained_store(&dir);

        let manifest = build_index(&store).unwrap();
        assert_eq!(manifest.track_count, 3);
        assert_eq!(manifest.dimensions, 12);
        assert_eq!(manifest.columns.len(), manifest.dimensions);
        assert!(store.is_complete());

        let artifacts = store.load().unwrap();
        assert_eq!(artifacts.index.len(), 3);
        assert_eq!(artifacts.manifest, manifest);
        assert_eq!(manifest.run_id, store.catalog_run_id().unwrap());
    }

    #[test]
    fn test_build_index_rejects_pipeline_from_another_run() {
        let dir = TempDir::new().unwrap();
        let store = trained_store(&dir);
        let catalog = store.load_catalog().unwrap();
        store.save_catalog(&catalog, Uuid::new_v4()).unwrap();

        let err = build_index(&store).unwrap_err();
        assert!(matches!(
            err,
            TrainError::Artifact(ArtifactError::Corrupt { ref file, .. }) if file == PIPELINE_FILE
        ));
        assert!(store.missing_files().contains(&"index.json.gz".to_string()));
    }

    #[test]
    fn test_build_index_requires_pipeline() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        store
            .save_catalog(
                &Catalog::new(vec![Track::new("a", "A", "T", "pop")]).unwrap(),
                Uuid::new_v4(),
            )
            .unwrap();

        let err = build_index(&store).unwrap_err();
        assert!(matches!(err, TrainError::Artifact(ref e) if e.is_missing()));
    }

    #[tokio::test]
    async fn test_index_stage_records_run() {
        let dir = TempDir::new().unwrap();
        let store = trained_store(&dir);
        let stage = IndexStage::new(store);
        let job = crate::TrainingJob::new("train-job", dir.path().join("dataset.csv"));
        let mut ctx = StageContext::new("index".to_string());

        let outcome = stage.execute(&job, &mut ctx).await.unwrap();
        assert_eq!(outcome, StageOutcome::Complete);
        assert_eq!(
            ctx.metadata.get("track_count").unwrap(),
            &serde_json::json!(3)
        );
    }
}
