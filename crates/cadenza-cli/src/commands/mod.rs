use anyhow::Result;
use cadenza_etl::{ArtifactStore, Config};
use cadenza_recommend::{RecommendConfig, RecommendationEngine};

pub mod browse;
pub mod config;
pub mod interactive;
pub mod recommend;
pub mod status;
pub mod train;

pub use browse::run_browse;
pub use interactive::run_interactive;
pub use recommend::run_recommend;
pub use status::show_status;
pub use train::run_train;

/// Load the engine from the configured artifact directory.
///
/// Missing artifacts get a pointer to `cadenza train` instead of a bare
/// file list.
pub fn load_engine(config: &Config) -> Result<RecommendationEngine> {
    let store = ArtifactStore::new(&config.artifact_dir);
    RecommendationEngine::from_store(&store, RecommendConfig::default()).map_err(|e| {
        if e.is_missing_artifacts() {
            anyhow::anyhow!("{e}\n\nPlease run 'cadenza train' first to generate the model artifacts.")
        } else {
            anyhow::Error::new(e).context("Failed to load model artifacts")
        }
    })
}
