/// Thresholds and weights used at query time.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendConfig {
    /// Neighbors pulled from the index before filtering.
    pub neighbors: usize,
    /// Maximum recommendations returned.
    pub top_n: usize,
    /// Allowed tempo deviation as a fraction of the input tempo.
    pub tempo_tolerance: f64,
    /// Allowed absolute loudness difference in dB.
    pub loudness_tolerance: f64,
    /// Accepted candidates per artist, the input artist included.
    pub artist_cap: usize,
    /// Multiplier on the cosine similarity percentage.
    pub audio_weight: f64,
    pub genre_bonus: f64,
    pub artist_bonus: f64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            neighbors: 50,
            top_n: 10,
            tempo_tolerance: 0.20,
            loudness_tolerance: 4.5,
            artist_cap: 2,
            audio_weight: 0.90,
            genre_bonus: 5.0,
            artist_bonus: 5.0,
        }
    }
}

impl RecommendConfig {
    /// Match score for a candidate at cosine distance `distance`, clamped to
    /// `[0, 100]`.
    #[must_use]
    pub fn score(&self, distance: f64, same_genre: bool, same_artist: bool) -> f64 {
        let audio = (1.0 - distance) * 100.0 * self.audio_weight;
        let genre = if same_genre { self.genre_bonus } else { 0.0 };
        let artist = if same_artist { self.artist_bonus } else { 0.0 };
        (audio + genre + artist).clamp(0.0, 100.0)
    }
}
