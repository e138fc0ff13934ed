//! One-shot training without the workflow engine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use cadenza_core::FeatureWeights;

use crate::artifacts::{ArtifactStore, Manifest};
use crate::error::TrainError;
use crate::featurize::featurize;
use crate::index::build_index;
use crate::ingest::ingest;
use crate::loader::LoadReport;

/// What a completed training run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub report: LoadReport,
    pub manifest: Manifest,
}

/// Run ingest, featurize, and index in order, writing every artifact to
/// `store`.
///
/// A failure leaves any artifacts from a previous run that were not yet
/// overwritten in place; `ArtifactStore::load` detects the mismatch.
pub fn train(
    data_path: &Path,
    store: &ArtifactStore,
    weights: FeatureWeights,
) -> Result<TrainingSummary, TrainError> {
    weights.validate()?;

    log::info!(
        "Training from {} into {}",
        data_path.display(),
        store.dir().display()
    );
    let report = ingest(data_path, store)?;
    featurize(store, weights)?;
    let manifest = build_index(store)?;

    Ok(TrainingSummary { report, manifest })
}
