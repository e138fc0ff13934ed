use serde::{Deserialize, Serialize};
use std::fmt;

use cadenza_core::model::{Track, TrackId};

const RULE: &str = "============================================================";

/// The track a query resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSummary {
    pub position: usize,
    pub track_id: TrackId,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub loudness: f64,
    pub tempo: f64,
}

impl InputSummary {
    #[must_use]
    pub fn from_track(position: usize, track: &Track) -> Self {
        Self {
            position,
            track_id: track.track_id.clone(),
            title: track.track_name.clone(),
            artist: track.artists.clone(),
            genre: track.track_genre.clone(),
            loudness: track.loudness,
            tempo: track.tempo,
        }
    }
}

/// One accepted, scored recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// 1-based rank in the final list.
    pub rank: usize,
    pub position: usize,
    pub track_id: TrackId,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub loudness: f64,
    pub tempo: f64,
    /// Cosine distance from the input track.
    pub distance: f64,
    /// Match score in `[0, 100]`. A heuristic, not a probability.
    pub score: f64,
}

impl Candidate {
    pub(crate) fn from_track(position: usize, track: &Track, distance: f64, score: f64) -> Self {
        Self {
            rank: 0,
            position,
            track_id: track.track_id.clone(),
            title: track.track_name.clone(),
            artist: track.artists.clone(),
            genre: track.track_genre.clone(),
            loudness: track.loudness,
            tempo: track.tempo,
            distance,
            score,
        }
    }
}

/// Outcome of one query. Every variant is a normal result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Recommendation {
    /// Ranked candidates, best first.
    Found {
        input: InputSummary,
        candidates: Vec<Candidate>,
    },
    /// No title matched the query.
    NotFound { query: String },
    /// The query resolved but every neighbor was filtered out.
    NoCandidates { input: InputSummary },
}

impl Recommendation {
    /// The resolved input, if the query matched a title.
    #[must_use]
    pub const fn input(&self) -> Option<&InputSummary> {
        match self {
            Self::Found { input, .. } | Self::NoCandidates { input } => Some(input),
            Self::NotFound { .. } => None,
        }
    }

    /// Ranked candidates; empty unless `Found`.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            Self::Found { candidates, .. } => candidates,
            _ => &[],
        }
    }

    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

fn write_input_header(f: &mut fmt::Formatter<'_>, input: &InputSummary) -> fmt::Result {
    writeln!(f, "Input: '{}' - {}", input.title, input.artist)?;
    writeln!(
        f,
        "Spec: {} | {:?}dB | {:.0} BPM",
        input.genre, input.loudness, input.tempo
    )?;
    write!(f, "{RULE}")
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { query } => {
                write!(f, "Song '{query}' was not found in the database.")
            }
            Self::NoCandidates { input } => {
                write_input_header(f, input)?;
                write!(
                    f,
                    "\nNo recommendations passed the strict audio filtering criteria."
                )
            }
            Self::Found { input, candidates } => {
                write_input_header(f, input)?;
                for candidate in candidates {
                    let mark = if candidate.artist == input.artist {
                        " ★"
                    } else {
                        ""
                    };
                    write!(
                        f,
                        "\n{}. {} - {}{}\n   [Gen: {} | Vol: {:?}dB] -> Match: {:.1}%",
                        candidate.rank,
                        candidate.title,
                        candidate.artist,
                        mark,
                        candidate.genre,
                        candidate.loudness,
                        candidate.score
                    )?;
                }
                Ok(())
            }
        }
    }
}
