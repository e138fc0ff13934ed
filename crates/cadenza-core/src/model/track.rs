use serde::{Deserialize, Serialize};

use crate::model::ids::TrackId;

/// The numeric audio descriptors of a track.
///
/// The declaration order is the column order of the audio block in the
/// feature matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFeature {
    Danceability,
    Energy,
    Valence,
    Tempo,
    Acousticness,
    Instrumentalness,
    Liveness,
    Loudness,
}

impl AudioFeature {
    /// All audio descriptors in matrix column order.
    pub const ALL: [Self; 8] = [
        Self::Danceability,
        Self::Energy,
        Self::Valence,
        Self::Tempo,
        Self::Acousticness,
        Self::Instrumentalness,
        Self::Liveness,
        Self::Loudness,
    ];

    /// Column name used in datasets and weight tables.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Danceability => "danceability",
            Self::Energy => "energy",
            Self::Valence => "valence",
            Self::Tempo => "tempo",
            Self::Acousticness => "acousticness",
            Self::Instrumentalness => "instrumentalness",
            Self::Liveness => "liveness",
            Self::Loudness => "loudness",
        }
    }
}

/// One row of the catalog.
///
/// Tracks are immutable once loaded; every selected column is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: TrackId,

    /// Display artist string, as it appears in the dataset (may list several
    /// artists separated by `;`).
    pub artists: String,

    pub track_name: String,
    pub track_genre: String,

    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,

    /// Beats per minute.
    pub tempo: f64,

    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,

    /// Overall loudness in dB (typically negative).
    pub loudness: f64,

    pub popularity: f64,
    pub explicit: bool,
}

impl Track {
    /// Create a track with the given identity and display fields and all
    /// numeric descriptors set to zero.
    #[must_use]
    pub fn new(
        track_id: impl Into<TrackId>,
        artists: impl Into<String>,
        track_name: impl Into<String>,
        track_genre: impl Into<String>,
    ) -> Self {
        Self {
            track_id: track_id.into(),
            artists: artists.into(),
            track_name: track_name.into(),
            track_genre: track_genre.into(),
            danceability: 0.0,
            energy: 0.0,
            valence: 0.0,
            tempo: 0.0,
            acousticness: 0.0,
            instrumentalness: 0.0,
            liveness: 0.0,
            loudness: 0.0,
            popularity: 0.0,
            explicit: false,
        }
    }

    #[must_use]
    pub fn with_audio(mut self, feature: AudioFeature, value: f64) -> Self {
        *self.audio_mut(feature) = value;
        self
    }

    #[must_use]
    pub fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = popularity;
        self
    }

    #[must_use]
    pub fn with_explicit(mut self, explicit: bool) -> Self {
        self.explicit = explicit;
        self
    }

    /// Value of an audio descriptor.
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

    fn audio_mut(&mut self, feature: AudioFeature) -> &mut f64 {
        match feature {
            AudioFeature::Danceability => &mut self.danceability,
            AudioFeature::Energy => &mut self.energy,
            AudioFeature::Valence => &mut self.valence,
            AudioFeature::Tempo => &mut self.tempo,
            AudioFeature::Acousticness => &mut self.acousticness,
            AudioFeature::Instrumentalness => &mut self.instrumentalness,
            AudioFeature::Liveness => &mut self.liveness,
            AudioFeature::Loudness => &mut self.loudness,
        }
    }

    /// The explicit flag as stored in the feature matrix (0 or 1).
    #[must_use]
    pub const fn explicit_value(&self) -> f64 {
        if self.explicit {
            1.0
        } else {
            0.0
        }
    }
}
