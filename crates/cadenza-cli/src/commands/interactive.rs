use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

use cadenza_etl::Config;
use cadenza_recommend::RecommendationEngine;

const PROMPT: &str = "\nEnter a song title (or 'exit' to quit): ";
const SEPARATOR: &str = "------------------------------------------------------------";

/// Prompt for titles on stdin until `exit` or end of input.
pub fn run_interactive(config: &Config) -> Result<()> {
    let engine = super::load_engine(config)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(&engine, stdin.lock(), stdout.lock())
}

fn run_session<R: BufRead, W: Write>(
    engine: &RecommendationEngine,
    mut input: R,
    mut output: W,
) -> Result<()> {
    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line).context("Failed to read input")? == 0 {
            writeln!(output)?;
            break;
        }

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            writeln!(output, "Exiting. Goodbye!")?;
            break;
        }

        writeln!(output, "Searching for matches for '{query}'...")?;
        writeln!(output, "{SEPARATOR}")?;
        writeln!(output, "{}", engine.recommend(query))?;
        writeln!(output, "{SEPARATOR}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_core::model::{AudioFeature, Track};
    use cadenza_core::{Catalog, FeaturePipeline, FeatureWeights};
    use cadenza_recommend::RecommendConfig;
    use cadenza_search::SimilarityIndex;

    fn engine() -> RecommendationEngine {
        let catalog = Catalog::new(vec![
            Track::new("a", "Aria", "Night Drive", "synthwave")
                .with_audio(AudioFeature::Tempo, 120.0)
                .with_audio(AudioFeature::Loudness, -6.0),
            Track::new("b", "Bo", "City Lights", "synthwave")
                .with_audio(AudioFeature::Tempo, 118.0)
                .with_audio(AudioFeature::Loudness, -6.5),
        ])
        .unwrap();
        let (pipeline, matrix) =
            FeaturePipeline::fit_transform(&catalog, FeatureWeights::default()).unwrap();
        let index = SimilarityIndex::build(matrix).unwrap();
        RecommendationEngine::new(catalog, pipeline, index, RecommendConfig::default()).unwrap()
    }

    fn session(input: &str) -> String {
        let mut output = Vec::new();
        run_session(&engine(), input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_session_answers_until_exit() {
        let output = session("night drive\n\nEXIT\nzzz\n");
        assert!(output.contains("Searching for matches for 'night drive'..."));
        assert!(output.contains("1. City Lights - Bo"));
        assert!(output.contains("Goodbye"));
        assert!(!output.contains("'zzz'"));
    }

    #[test]
    fn test_session_reports_not_found() {
        let output = session("zzz\n");
        assert!(output.contains("Song 'zzz' was not found in the database."));
    }
}
