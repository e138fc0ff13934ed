use anyhow::Result;

use cadenza_etl::Config;
use cadenza_recommend::Recommendation;

/// Open the recommendations TUI seeded with `title`.
pub fn run_browse(config: &Config, title: &str) -> Result<()> {
    let engine = super::load_engine(config)?;
    let recommendation = engine.recommend(title);

    if !recommendation.is_found() {
        println!("{recommendation}");
        if let Recommendation::NotFound { .. } = recommendation {
            println!("\nTry a shorter part of the title.");
        }
        return Ok(());
    }

    crate::tui::run_tui(engine, recommendation)
}
