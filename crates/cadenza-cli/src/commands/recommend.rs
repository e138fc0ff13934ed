use anyhow::Result;

use cadenza_etl::Config;

const SEPARATOR: &str = "------------------------------------------------------------";

/// One-shot recommendation for `title`.
pub fn run_recommend(config: &Config, title: &str, limit: Option<usize>) -> Result<()> {
    let engine = super::load_engine(config)?;
    let limit = limit.unwrap_or(engine.config().top_n);

    println!("Searching for matches for '{title}'...");
    println!("{SEPARATOR}");
    println!("{}", engine.recommend_with_limit(title, limit));
    println!("{SEPARATOR}");

    Ok(())
}
