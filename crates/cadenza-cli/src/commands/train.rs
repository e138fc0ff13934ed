use anyhow::{Context, Result};
use std::path::PathBuf;

use cadenza_etl::{build_training_pipeline, ArtifactStore, Config, TrainingJob};

/// Run the ingest → featurize → index workflow and report the result.
pub async fn run_train(data_path: PathBuf, config: &Config) -> Result<()> {
    let artifact_dir = config.artifact_dir.clone();

    println!("\n🎵 Cadenza Training\n");
    println!("  Dataset: {}", data_path.display());
    println!("  Artifacts: {}", artifact_dir.display());
    println!();

    std::fs::create_dir_all(&artifact_dir).context("Failed to create artifact directory")?;

    let workflow = build_training_pipeline(
        data_path.clone(),
        artifact_dir.clone(),
        config.weights.clone(),
    )
    .context("Failed to build training pipeline")?;

    let state_path = artifact_dir.join("pipeline.db");
    let mut store = treadle::SqliteStateStore::open(&state_path)
        .await
        .context("Failed to open pipeline state store")?;

    let job = TrainingJob::for_run(data_path);
    let started = chrono::Utc::now();

    // Subscribe to events for progress display
    let mut events = workflow.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                treadle::WorkflowEvent::StageStarted { stage, .. } => {
                    println!("  ⏳ [{stage}] Starting...");
                }
                treadle::WorkflowEvent::StageCompleted { stage, .. } => {
                    println!("  ✓ [{stage}] Complete");
                }
                treadle::WorkflowEvent::StageFailed { stage, error, .. } => {
                    eprintln!("  ✗ [{stage}] FAILED: {error}");
                }
                _ => {}
            }
        }
    });

    workflow
        .advance(&job, &mut store)
        .await
        .context("Training pipeline execution failed")?;

    // A failed stage stops the workflow without an error from advance, so
    // confirm this run actually wrote a manifest.
    let artifacts = ArtifactStore::new(&artifact_dir);
    let manifest = match artifacts.load_manifest() {
        Ok(manifest) if manifest.trained_at >= started => manifest,
        _ => anyhow::bail!("Training did not complete; see the stage errors above"),
    };

    println!("\n✓ Training complete!");
    println!("  Run: {}", manifest.run_id);
    println!("  Tracks: {}", manifest.track_count);
    println!("  Features: {}", manifest.dimensions);
    println!("\nNext steps:");
    println!("  - Run 'cadenza recommend \"<title>\"' for recommendations");
    println!("  - Run 'cadenza interactive' to search repeatedly");

    Ok(())
}
