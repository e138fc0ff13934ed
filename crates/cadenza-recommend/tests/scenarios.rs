//! End-to-end scenarios: train from CSV, load the artifacts, query.

use std::fmt::Write as _;
use tempfile::TempDir;

use cadenza_core::FeatureWeights;
use cadenza_etl::{train, ArtifactStore};
use cadenza_recommend::{EngineError, RecommendConfig, Recommendation, RecommendationEngine};

const HEADER: &str = "track_id,artists,track_name,track_genre,danceability,energy,valence,tempo,acousticness,instrumentalness,liveness,loudness,popularity,explicit";

struct Row<'a> {
    id: &'a str,
    artist: &'a str,
    title: &'a str,
    genre: &'a str,
    nudge: f64,
    tempo: f64,
    loudness: f64,
    popularity: f64,
}

impl Row<'_> {
    fn write(&self, csv: &mut String) {
        writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},False",
            self.id,
            self.artist,
            self.title,
            self.genre,
            0.60 + self.nudge,
            0.80 - self.nudge,
            0.50 + self.nudge,
            self.tempo,
            0.10 + self.nudge,
            0.02,
            0.12,
            self.loudness,
            self.popularity,
        )
        .unwrap();
    }
}

fn row<'a>(id: &'a str, artist: &'a str, title: &'a str, nudge: f64) -> Row<'a> {
    Row {
        id,
        artist,
        title,
        genre: "synthwave",
        nudge,
        tempo: 120.0 + nudge * 50.0,
        loudness: -6.0 - nudge * 10.0,
        popularity: 50.0,
    }
}

/// An ambient block far away from the synthwave cluster, so every catalog
/// has more than one genre and the scalers see real variance.
fn ambient_rows(csv: &mut String) {
    for i in 0..5 {
        let id = format!("amb{i}");
        let title = format!("Drift {i}");
        let artist = format!("Ambient {i}");
        Row {
            id: &id,
            artist: &artist,
            title: &title,
            genre: "ambient",
            nudge: 0.0,
            tempo: 70.0,
            loudness: -20.0,
            popularity: 20.0,
        }
        .write(csv);
    }
}

fn build_engine(dir: &TempDir, rows: &[Row<'_>]) -> RecommendationEngine {
    let mut csv = format!("{HEADER}\n");
    for r in rows {
        r.write(&mut csv);
    }
    ambient_rows(&mut csv);

    let data_path = dir.path().join("dataset.csv");
    std::fs::write(&data_path, csv).unwrap();
    let store = ArtifactStore::new(dir.path().join("models"));
    train(&data_path, &store, FeatureWeights::default()).unwrap();

    RecommendationEngine::from_store(&store, RecommendConfig::default()).unwrap()
}

fn night_drive_rows() -> Vec<Row<'static>> {
    let others = [
        ("t2", "Bo", "City Lights"),
        ("t3", "Cy", "Neon Rain"),
        ("t4", "Di", "Chrome Hearts"),
        ("t5", "Ed", "Midnight Run"),
        ("t6", "Fay", "Overpass"),
        ("t7", "Gus", "Sodium Glow"),
        ("t8", "Hal", "Palm Static"),
        ("t9", "Ivy", "Laserdisc"),
        ("t10", "Jo", "Afterhours"),
    ];
    let mut rows = vec![row("t1", "Aria", "Night Drive", 0.0)];
    for (i, (id, artist, title)) in others.into_iter().enumerate() {
        rows.push(row(id, artist, title, 0.002 * (i as f64 + 1.0)));
    }
    rows
}

#[test]
fn test_night_drive_returns_all_near_duplicates() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir, &night_drive_rows());

    for query in ["night drive", "NIGHT DRIVE", "Night Drive"] {
        let rec = engine.recommend(query);
        let input = rec.input().unwrap();
        assert_eq!(input.title, "Night Drive");
        assert_eq!(input.artist, "Aria");
        assert_eq!(input.tempo, 120.0);
        assert_eq!(input.loudness, -6.0);

        let candidates = rec.candidates();
        assert_eq!(candidates.len(), 9);
        assert!(candidates.iter().all(|c| c.title != "Night Drive"));
        assert!(candidates.iter().all(|c| c.genre == "synthwave"));
        assert!(candidates.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn test_unknown_title_is_not_found() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir, &night_drive_rows());

    let rec = engine.recommend("Definitely Not A Song");
    assert_eq!(
        rec,
        Recommendation::NotFound {
            query: "Definitely Not A Song".to_string()
        }
    );
    assert!(rec.candidates().is_empty());
    assert!(rec.to_string().contains("was not found"));
}

#[test]
fn test_artist_cap_keeps_top_two() {
    let dir = TempDir::new().unwrap();
    let rows = vec![
        row("t1", "Aria", "Night Drive", 0.0),
        row("t2", "Aria", "Second Gear", 0.001),
        row("t3", "Aria", "Third Street", 0.002),
        row("t4", "Aria", "Fourth Wall", 0.003),
        row("t5", "Bo", "City Lights", 0.004),
    ];
    let engine = build_engine(&dir, &rows);

    let rec = engine.recommend("night drive");
    let aria: Vec<&str> = rec
        .candidates()
        .iter()
        .filter(|c| c.artist == "Aria")
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(aria, vec!["Second Gear", "Third Street"]);
    assert!(rec.candidates().iter().any(|c| c.artist == "Bo"));
}

#[test]
fn test_exact_match_prefers_popular_version() {
    let dir = TempDir::new().unwrap();
    let mut quiet = row("t1", "Aria", "Night Drive", 0.0);
    quiet.popularity = 10.0;
    let mut popular = row("t2", "Bo", "Night Drive", 0.01);
    popular.popularity = 90.0;
    let engine = build_engine(&dir, &[quiet, popular, row("t3", "Cy", "Neon Rain", 0.02)]);

    let rec = engine.recommend("night drive");
    assert_eq!(rec.input().unwrap().artist, "Bo");
    // The other "Night Drive" collapses with the input title.
    assert!(rec.candidates().iter().all(|c| c.title != "Night Drive"));
}

#[test]
fn test_substring_fallback() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir, &night_drive_rows());
    let rec = engine.recommend("lights");
    assert_eq!(rec.input().unwrap().title, "City Lights");
}

#[test]
fn test_everything_filtered_is_no_candidates() {
    let dir = TempDir::new().unwrap();
    let mut loud = row("t1", "Aria", "Night Drive", 0.0);
    loud.loudness = 0.0;
    loud.tempo = 200.0;
    let engine = build_engine(&dir, &[loud, row("t2", "Bo", "City Lights", 0.01)]);

    let rec = engine.recommend("night drive");
    assert!(matches!(rec, Recommendation::NoCandidates { .. }));
    assert!(rec
        .to_string()
        .ends_with("No recommendations passed the strict audio filtering criteria."));
}

#[test]
fn test_repeated_queries_are_identical() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir, &night_drive_rows());
    let first = engine.recommend("night drive");
    for _ in 0..5 {
        assert_eq!(engine.recommend("night drive"), first);
    }

    // A second engine over the same artifacts agrees too.
    let reloaded = RecommendationEngine::from_store(
        &ArtifactStore::new(dir.path().join("models")),
        RecommendConfig::default(),
    )
    .unwrap();
    assert_eq!(reloaded.recommend("night drive"), first);
}

#[test]
fn test_round_trip_row_count() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir, &night_drive_rows());
    assert_eq!(engine.catalog().len(), 15);
    assert_eq!(engine.index().len(), 15);
}

#[test]
fn test_missing_artifacts_is_distinct_error() {
    let dir = TempDir::new().unwrap();
    let err = RecommendationEngine::from_store(
        &ArtifactStore::new(dir.path()),
        RecommendConfig::default(),
    )
    .unwrap_err();
    assert!(err.is_missing_artifacts());
    assert!(matches!(err, EngineError::Artifact(_)));
}
