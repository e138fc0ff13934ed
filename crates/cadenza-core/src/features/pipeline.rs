use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::features::encoder::OneHotEncoder;
use crate::features::matrix::FeatureMatrix;
use crate::features::scaler::{MinMaxScaler, StandardScaler};
use crate::features::weights::FeatureWeights;
use crate::model::{AudioFeature, Track};

/// Fitted feature transforms plus the weights they were fitted with.
///
/// Column layout of every produced vector:
///
/// | block      | columns                              | transform         |
/// |------------|--------------------------------------|-------------------|
/// | audio      | 8, in [`AudioFeature::ALL`] order    | standardized      |
/// | popularity | 1                                    | min-max to [0, 1] |
/// | explicit   | 1                                    | 0/1 passthrough   |
/// | genre      | one per genre seen at fit time       | one-hot           |
///
/// The pipeline is persisted alongside the index. Query-time vectors must be
/// produced by the same fitted instance, never by refitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipeline {
    weights: FeatureWeights,
    audio_scaler: StandardScaler,
    popularity_scaler: MinMaxScaler,
    genre_encoder: OneHotEncoder,
}

impl FeaturePipeline {
    /// Fit all transforms on the full catalog.
    ///
    /// # Errors
    /// Returns `Error::InvalidWeight` for a non-positive weight and
    /// `Error::EmptyDataset` for an empty catalog.
    pub fn fit(catalog: &Catalog, weights: FeatureWeights) -> Result<Self> {
        weights.validate()?;
        if catalog.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let audio_rows: Vec<Vec<f64>> = catalog.tracks().iter().map(audio_row).collect();
        let popularity_rows: Vec<Vec<f64>> = catalog
            .tracks()
            .iter()
            .map(|t| vec![t.popularity])
            .collect();

        let pipeline = Self {
            audio_scaler: StandardScaler::fit(&audio_rows)?,
            popularity_scaler: MinMaxScaler::fit(&popularity_rows)?,
            genre_encoder: OneHotEncoder::fit(
                catalog.tracks().iter().map(|t| t.track_genre.as_str()),
            ),
            weights,
        };

        log::info!(
            "Fitted feature pipeline on {} tracks: {} columns ({} genres)",
            catalog.len(),
            pipeline.dimensions(),
            pipeline.genre_encoder.width()
        );

        Ok(pipeline)
    }

    /// Fit on the catalog and transform it in one step.
    pub fn fit_transform(
        catalog: &Catalog,
        weights: FeatureWeights,
    ) -> Result<(Self, FeatureMatrix)> {
        let pipeline = Self::fit(catalog, weights)?;
        let matrix = pipeline.transform(catalog)?;
        Ok((pipeline, matrix))
    }

    #[must_use]
    pub const fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    /// Width of every produced feature vector.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        AudioFeature::ALL.len() + 2 + self.genre_encoder.width()
    }

    /// Column names in matrix order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = AudioFeature::ALL
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        names.push("popularity".to_string());
        names.push("explicit".to_string());
        names.extend(
            self.genre_encoder
                .categories()
                .iter()
                .map(|g| format!("track_genre_{g}")),
        );
        names
    }

    /// Weighted feature vector for one track.
    ///
    /// Genres unseen at fit time contribute an all-zero genre block.
    #[must_use]
    pub fn transform_track(&self, track: &Track) -> Vec<f64> {
        let mut vector = Vec::with_capacity(self.dimensions());

        let audio = self.audio_scaler.transform_row(&audio_row(track));
        vector.extend(
            audio
                .iter()
                .zip(AudioFeature::ALL)
                .map(|(v, f)| v * self.weights.audio(f)),
        );

        let popularity = self.popularity_scaler.transform_row(&[track.popularity]);
        vector.extend(popularity.iter().map(|v| v * self.weights.popularity));

        vector.push(track.explicit_value() * self.weights.explicit);

        vector.extend(
            self.genre_encoder
                .encode(&track.track_genre)
                .iter()
                .map(|v| v * self.weights.track_genre),
        );

        vector
    }

    /// Transform every track of the catalog, preserving positions.
    pub fn transform(&self, catalog: &Catalog) -> Result<FeatureMatrix> {
        let rows = catalog
            .tracks()
            .iter()
            .map(|t| self.transform_track(t))
            .collect();
        FeatureMatrix::from_rows(rows)
    }
}

fn audio_row(track: &Track) -> Vec<f64> {
    AudioFeature::ALL.iter().map(|&f| track.audio(f)).collect()
}
