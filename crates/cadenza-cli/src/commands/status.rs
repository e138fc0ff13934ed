use anyhow::Result;

use cadenza_etl::{ArtifactStore, Config};

pub fn show_status(config: &Config) -> Result<()> {
    let store = ArtifactStore::new(&config.artifact_dir);

    println!("\n📊 Cadenza Status\n");
    println!("  Artifacts: {}", store.dir().display());

    let missing = store.missing_files();
    if !missing.is_empty() {
        println!("  State: not trained (missing {})", missing.join(", "));
        println!("\n  Run `cadenza train` to build the model");
        return Ok(());
    }

    let manifest = store.load_manifest()?;
    let stored_tracks = store.open_catalog()?.track_count()?;
    let catalog_run = store.catalog_run_id()?;
    let genres = manifest
        .columns
        .iter()
        .filter(|c| c.starts_with("track_genre_"))
        .count();

    if catalog_run == manifest.run_id {
        println!("  State: trained");
    } else {
        println!("  State: inconsistent (catalog from run {catalog_run})");
    }
    println!("  Run: {}", manifest.run_id);
    println!("  Trained at: {}", manifest.trained_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Tracks: {} ({} in catalog.db)", manifest.track_count, stored_tracks);
    println!("  Features: {} ({} genres)", manifest.dimensions, genres);

    if catalog_run != manifest.run_id {
        println!("\n  Run `cadenza train` to rebuild the model");
    }

    Ok(())
}
