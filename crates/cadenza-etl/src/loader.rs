//! CSV catalog loader.
//!
//! Reads a Spotify-style track table, keeps the columns the feature pipeline
//! needs, and cleans it:
//!
//! 1. duplicate `track_id` rows are dropped, keeping the first occurrence;
//! 2. rows with an empty or unparseable value in any selected column are
//!    dropped.
//!
//! Surviving rows keep their file order, which becomes catalog position.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use cadenza_core::model::{AudioFeature, Track, TrackId};
use cadenza_core::Catalog;

use crate::error::LoadError;

/// Older exports name the genre column `genre`.
const GENRE_ALIAS: &str = "genre";

/// Counts describing what the cleaning step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub dropped_duplicates: usize,
    pub dropped_incomplete: usize,
    pub kept: usize,
}

/// A cleaned catalog and the report of how it was produced.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub report: LoadReport,
}

/// Load and clean the catalog at `path`.
pub fn load_catalog(path: &Path) -> Result<LoadedCatalog, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    log::info!("Loading catalog from {}", path.display());
    let reader = std::fs::File::open(path).map_err(csv::Error::from)?;
    load_catalog_from_reader(reader)
}

/// Load and clean a catalog from any CSV source.
pub fn load_catalog_from_reader<R: Read>(reader: R) -> Result<LoadedCatalog, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(csv_reader.headers()?)?;

    let mut report = LoadReport::default();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut tracks = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        report.rows_read += 1;

        let id = record.get(columns.track_id).unwrap_or_default();
        if !id.is_empty() && !seen_ids.insert(id.to_string()) {
            report.dropped_duplicates += 1;
            continue;
        }

        match columns.parse_track(&record) {
            Some(track) => tracks.push(track),
            None => report.dropped_incomplete += 1,
        }
    }

    report.kept = tracks.len();
    if report.dropped_duplicates > 0 || report.dropped_incomplete > 0 {
        log::warn!(
            "Dropped {} duplicate and {} incomplete rows out of {}",
            report.dropped_duplicates,
            report.dropped_incomplete,
            report.rows_read
        );
    }
    log::info!("Loaded {} tracks", report.kept);

    Ok(LoadedCatalog {
        catalog: Catalog::new(tracks)?,
        report,
    })
}

/// Header positions of every selected column.
#[derive(Debug)]
struct ColumnMap {
    track_id: usize,
    artists: usize,
    track_name: usize,
    track_genre: usize,
    audio: [usize; 8],
    popularity: usize,
    explicit: usize,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let positions: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();

        let missing = |column: &str| LoadError::Schema {
            column: column.to_string(),
            available: headers.iter().map(str::to_string).collect(),
        };
        let find = |column: &str| -> Result<usize, LoadError> {
            positions
                .get(column)
                .copied()
                .ok_or_else(|| missing(column))
        };

        // The genre column is the one the pipeline cannot run without, so it
        // is resolved first and reported first.
        let track_genre = find("track_genre")
            .or_else(|_| find(GENRE_ALIAS))
            .map_err(|_| missing("track_genre"))?;

        let mut audio = [0; 8];
        for (slot, feature) in audio.iter_mut().zip(AudioFeature::ALL) {
            *slot = find(feature.name())?;
        }

        Ok(Self {
            track_id: find("track_id")?,
            artists: find("artists")?,
            track_name: find("track_name")?,
            track_genre,
            audio,
            popularity: find("popularity")?,
            explicit: find("explicit")?,
        })
    }

    /// Parse a record, or `None` if any selected value is missing or invalid.
    fn parse_track(&self, record: &csv::StringRecord) -> Option<Track> {
        let text = |idx: usize| record.get(idx).filter(|v| !v.is_empty());
        let number = |idx: usize| text(idx)?.parse::<f64>().ok().filter(|v| v.is_finite());

        let mut track = Track::new(
            TrackId::new(text(self.track_id)?),
            text(self.artists)?,
            text(self.track_name)?,
            text(self.track_genre)?,
        );
        for (idx, feature) in self.audio.iter().zip(AudioFeature::ALL) {
            track = track.with_audio(feature, number(*idx)?);
        }
        Some(
            track
                .with_popularity(number(self.popularity)?)
                .with_explicit(parse_explicit(text(self.explicit)?)?),
        )
    }
}

fn parse_explicit(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" {
        Some(false)
    } else {
        None
    }
}
