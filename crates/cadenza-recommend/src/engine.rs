use std::collections::{HashMap, HashSet};

use cadenza_core::model::Track;
use cadenza_core::{Catalog, FeaturePipeline};
use cadenza_etl::{ArtifactStore, Artifacts};
use cadenza_search::{Neighbor, SimilarityIndex};

use crate::config::RecommendConfig;
use crate::error::{EngineError, EngineResult};
use crate::resolve::{default_matchers, TitleMatcher};
use crate::result::{Candidate, InputSummary, Recommendation};

/// Immutable serving state: catalog, fitted pipeline and index.
///
/// Catalog position is the join key between all three, so construction
/// checks that they line up. After that the engine is read-only and can be
/// shared across threads without locking.
#[derive(Debug)]
pub struct RecommendationEngine {
    catalog: Catalog,
    pipeline: FeaturePipeline,
    index: SimilarityIndex,
    config: RecommendConfig,
    matchers: Vec<Box<dyn TitleMatcher>>,
}

impl RecommendationEngine {
    /// # Errors
    /// Returns a mismatch error if the catalog, pipeline and index do not
    /// describe the same rows and columns.
    pub fn new(
        catalog: Catalog,
        pipeline: FeaturePipeline,
        index: SimilarityIndex,
        config: RecommendConfig,
    ) -> EngineResult<Self> {
        if catalog.len() != index.len() {
            return Err(EngineError::CatalogMismatch {
                tracks: catalog.len(),
                rows: index.len(),
            });
        }
        if pipeline.dimensions() != index.dimensions() {
            return Err(EngineError::DimensionMismatch {
                pipeline: pipeline.dimensions(),
                index: index.dimensions(),
            });
        }

        Ok(Self {
            catalog,
            pipeline,
            index,
            config,
            matchers: default_matchers(),
        })
    }

    /// Build an engine from already loaded artifacts.
    pub fn from_artifacts(artifacts: Artifacts, config: RecommendConfig) -> EngineResult<Self> {
        Self::new(
            artifacts.catalog,
            artifacts.pipeline,
            artifacts.index,
            config,
        )
    }

    /// Load artifacts from `store` and build an engine.
    ///
    /// # Errors
    /// `EngineError::Artifact` wrapping `ArtifactError::Missing` when training
    /// has not been run.
    pub fn from_store(store: &ArtifactStore, config: RecommendConfig) -> EngineResult<Self> {
        Self::from_artifacts(store.load()?, config)
    }

    /// Append a title matcher, tried after the existing ones.
    #[must_use]
    pub fn with_matcher(mut self, matcher: impl TitleMatcher + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    #[must_use]
    pub const fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    #[must_use]
    pub const fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Resolve a query to a catalog position using the matchers in order.
    ///
    /// A blank query never matches.
    #[must_use]
    pub fn resolve(&self, query: &str) -> Option<usize> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.matchers.iter().find_map(|matcher| {
            let hit = matcher.find_match(&self.catalog, query);
            if let Some(position) = hit {
                log::debug!("'{}' resolved by {} matcher to {}", query, matcher.name(), position);
            }
            hit
        })
    }

    /// Recommend up to `config.top_n` tracks similar to `query`.
    ///
    /// The query is trimmed first; a blank query is `NotFound` rather than a
    /// substring match against every title.
    #[must_use]
    pub fn recommend(&self, query: &str) -> Recommendation {
        self.recommend_with_limit(query, self.config.top_n)
    }

    /// Recommend up to `limit` tracks similar to `query`.
    #[must_use]
    pub fn recommend_with_limit(&self, query: &str, limit: usize) -> Recommendation {
        let Some((position, track)) = self
            .resolve(query)
            .and_then(|p| self.catalog.get(p).map(|t| (p, t)))
        else {
            return Recommendation::NotFound {
                query: query.to_string(),
            };
        };
        self.recommend_for(position, track, limit)
    }

    /// Recommend tracks similar to the track at `position`.
    ///
    /// Returns `None` for a position outside the catalog.
    #[must_use]
    pub fn recommend_position(&self, position: usize, limit: usize) -> Option<Recommendation> {
        let track = self.catalog.get(position)?;
        Some(self.recommend_for(position, track, limit))
    }

    fn recommend_for(&self, position: usize, input: &Track, limit: usize) -> Recommendation {
        // Positions were checked against the index at construction.
        let neighbors = self
            .index
            .query_row(position, self.config.neighbors)
            .unwrap_or_default();

        let mut candidates = self.select(position, input, &neighbors);
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(limit);
        for (i, candidate) in candidates.iter_mut().enumerate() {
            candidate.rank = i + 1;
        }

        let input = InputSummary::from_track(position, input);
        if candidates.is_empty() {
            Recommendation::NoCandidates { input }
        } else {
            Recommendation::Found { input, candidates }
        }
    }

    /// Walk neighbors in retrieval order, keeping those that pass every
    /// filter, and score them.
    fn select(&self, position: usize, input: &Track, neighbors: &[Neighbor]) -> Vec<Candidate> {
        let mut selection = Selection::new(input, &self.config);
        let mut rejected = RejectionCounts::default();

        let mut candidates = Vec::new();
        for neighbor in neighbors.iter().filter(|n| n.position != position) {
            let Some(track) = self.catalog.get(neighbor.position) else {
                continue;
            };
            match selection.check(track) {
                Ok(()) => {
                    selection.accept(track);
                    let score = self.config.score(
                        neighbor.distance,
                        track.track_genre == input.track_genre,
                        track.artists == input.artists,
                    );
                    candidates.push(Candidate::from_track(
                        neighbor.position,
                        track,
                        neighbor.distance,
                        score,
                    ));
                }
                Err(rejection) => rejected.record(rejection),
            }
        }

        log::debug!(
            "'{}': {} neighbors, {} accepted, rejected {:?}",
            input.track_name,
            neighbors.len(),
            candidates.len(),
            rejected
        );
        candidates
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    DuplicateTitle,
    ArtistCap,
    Tempo,
    Loudness,
}

#[derive(Debug, Default)]
struct RejectionCounts {
    duplicate_title: usize,
    artist_cap: usize,
    tempo: usize,
    loudness: usize,
}

impl RejectionCounts {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::DuplicateTitle => self.duplicate_title += 1,
            Rejection::ArtistCap => self.artist_cap += 1,
            Rejection::Tempo => self.tempo += 1,
            Rejection::Loudness => self.loudness += 1,
        }
    }
}

/// Per-query accumulation state for the hard filters.
struct Selection<'a> {
    input: &'a Track,
    config: &'a RecommendConfig,
    seen_titles: HashSet<String>,
    artist_counts: HashMap<&'a str, usize>,
}

impl<'a> Selection<'a> {
    fn new(input: &'a Track, config: &'a RecommendConfig) -> Self {
        let mut seen_titles = HashSet::new();
        seen_titles.insert(input.track_name.to_lowercase());
        Self {
            input,
            config,
            seen_titles,
            artist_counts: HashMap::new(),
        }
    }

    /// Filters in order: title, artist cap, tempo, loudness.
    fn check(&self, track: &Track) -> Result<(), Rejection> {
        if self.seen_titles.contains(&track.track_name.to_lowercase()) {
            return Err(Rejection::DuplicateTitle);
        }
        let count = self
            .artist_counts
            .get(track.artists.as_str())
            .copied()
            .unwrap_or(0);
        if count >= self.config.artist_cap {
            return Err(Rejection::ArtistCap);
        }
        if (track.tempo - self.input.tempo).abs() > self.config.tempo_tolerance * self.input.tempo
        {
            return Err(Rejection::Tempo);
        }
        if (track.loudness - self.input.loudness).abs() > self.config.loudness_tolerance {
            return Err(Rejection::Loudness);
        }
        Ok(())
    }

    fn accept(&mut self, track: &'a Track) {
        self.seen_titles.insert(track.track_name.to_lowercase());
        *self.artist_counts.entry(track.artists.as_str()).or_insert(0) += 1;
    }
}
