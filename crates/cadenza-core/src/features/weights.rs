use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::AudioFeature;

/// Importance multipliers applied to each feature block.
///
/// Weights are configuration constants chosen by hand, never learned from
/// data. Loudness and acousticness carry era and production style, so they
/// are boosted; popularity is suppressed so the space measures sound rather
/// than chart position; the explicit flag is weighted heavily so explicit
/// and clean tracks land far apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    pub track_genre: f64,
    pub loudness: f64,
    pub acousticness: f64,
    pub valence: f64,
    pub energy: f64,
    pub tempo: f64,
    pub instrumentalness: f64,
    pub danceability: f64,
    pub liveness: f64,
    pub explicit: f64,
    pub popularity: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            track_genre: 2.2,
            loudness: 2.5,
            acousticness: 2.0,
            valence: 1.8,
            energy: 1.5,
            tempo: 1.5,
            instrumentalness: 1.2,
            danceability: 1.0,
            liveness: 0.8,
            explicit: 3.0,
            popularity: 0.1,
        }
    }
}

impl FeatureWeights {
    /// Weight for one audio descriptor column.
    #[must_use]
    pub const fn audio(&self, feature: AudioFeature) -> f64 {
        match feature {
            AudioFeature::Danceability => self.danceability,
            AudioFeature::Energy => self.energy,
            AudioFeature::Valence => self.valence,
            AudioFeature::Tempo => self.tempo,
            AudioFeature::Acousticness => self.acousticness,
            AudioFeature::Instrumentalness => self.instrumentalness,
            AudioFeature::Liveness => self.liveness,
            AudioFeature::Loudness => self.loudness,
        }
    }

    /// All weights keyed by feature name.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut entries: Vec<(&'static str, f64)> = AudioFeature::ALL
            .iter()
            .map(|&f| (f.name(), self.audio(f)))
            .collect();
        entries.push(("popularity", self.popularity));
        entries.push(("explicit", self.explicit));
        entries.push(("track_genre", self.track_genre));
        entries
    }

    /// Check that every weight is a positive, finite number.
    ///
    /// # Errors
    /// Returns `Error::InvalidWeight` naming the first offending feature.
    pub fn validate(&self) -> Result<()> {
        for (feature, value) in self.entries() {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidWeight {
                    feature: feature.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}
