use treadle::{Stage, StageContext, StageOutcome};

use cadenza_core::{FeaturePipeline, FeatureWeights};

use crate::artifacts::{ArtifactStore, StampedPipeline, PIPELINE_FILE};
use crate::error::TrainError;

/// Fit the feature pipeline on the stored catalog and persist it under the
/// catalog's run id.
pub fn featurize(
    store: &ArtifactStore,
    weights: FeatureWeights,
) -> Result<FeaturePipeline, TrainError> {
    let run_id = store.catalog_run_id()?;
    let catalog = store.load_catalog()?;
    let stamped = StampedPipeline {
        run_id,
        pipeline: FeaturePipeline::fit(&catalog, weights)?,
    };
    store.save_pipeline(&stamped)?;
    log::info!(
        "Saved feature pipeline to {}",
        store.path_of(PIPELINE_FILE).display()
    );
    Ok(stamped.pipeline)
}

/// The Featurize stage: `catalog.db` in, `pipeline.json` out.
#[derive(Debug)]
pub struct FeaturizeStage {
    store: ArtifactStore,
    weights: FeatureWeights,
}

impl FeaturizeStage {
    #[must_use]
    pub fn new(store: ArtifactStore, weights: FeatureWeights) -> Self {
        Self { store, weights }
    }
}

#[async_trait::async_trait]
impl Stage for FeaturizeStage {
    fn name(&self) -> &str {
        "featurize"
    }

    async fn execute(
        &self,
        _item: &dyn treadle::WorkItem,
        ctx: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        let pipeline = featurize(&self.store, self.weights.clone()).map_err(|e| {
            treadle::TreadleError::StageExecution(format!("Featurize failed: {e}"))
        })?;

        ctx.metadata.insert(
            "dimensions".to_string(),
            serde_json::Value::from(pipeline.dimensions()),
        );

        Ok(StageOutcome::Complete)
    }
}
