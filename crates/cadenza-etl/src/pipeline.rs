use std::path::PathBuf;
use treadle::Workflow;

use cadenza_core::FeatureWeights;

use crate::{ArtifactStore, FeaturizeStage, IndexStage, IngestStage};

/// Build the ingest → featurize → index training workflow.
///
/// # Errors
/// Returns an error if the weights are invalid or the workflow cannot be built.
pub fn build_training_pipeline(
    data_path: PathBuf,
    artifact_dir: PathBuf,
    weights: FeatureWeights,
) -> treadle::Result<Workflow> {
    weights.validate().map_err(|e| {
        treadle::TreadleError::InvalidWorkflow(format!("Invalid feature weights: {e}"))
    })?;

    let store = ArtifactStore::new(artifact_dir);

    Workflow::builder()
        .stage("ingest", IngestStage::new(data_path, store.clone()))
        .stage("featurize", FeaturizeStage::new(store.clone(), weights))
        .stage("index", IndexStage::new(store))
        .dependency("featurize", "ingest")
        .dependency("index", "featurize")
        .build()
}
