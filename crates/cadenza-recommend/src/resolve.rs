//! Title resolution strategies.
//!
//! The engine tries each matcher in order and uses the first hit, so new
//! strategies can be appended without touching ranking.

use std::fmt::Debug;

use cadenza_core::model::Track;
use cadenza_core::Catalog;

/// Maps a free-text query to a catalog position.
pub trait TitleMatcher: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// The matching position, or `None` when nothing matches.
    fn find_match(&self, catalog: &Catalog, query: &str) -> Option<usize>;
}

/// Case-insensitive equality on `track_name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl TitleMatcher for ExactMatcher {
    fn name(&self) -> &str {
        "exact"
    }

    fn find_match(&self, catalog: &Catalog, query: &str) -> Option<usize> {
        let query = query.to_lowercase();
        most_popular(
            catalog
                .iter()
                .filter(|(_, track)| track.track_name.to_lowercase() == query),
        )
    }
}

/// Case-insensitive containment on `track_name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl TitleMatcher for SubstringMatcher {
    fn name(&self) -> &str {
        "substring"
    }

    fn find_match(&self, catalog: &Catalog, query: &str) -> Option<usize> {
        let query = query.to_lowercase();
        most_popular(
            catalog
                .iter()
                .filter(|(_, track)| track.track_name.to_lowercase().contains(&query)),
        )
    }
}

/// Highest popularity wins; the earliest position wins among equals.
fn most_popular<'a>(matches: impl Iterator<Item = (usize, &'a Track)>) -> Option<usize> {
    matches
        .fold(None, |best: Option<(usize, f64)>, (position, track)| match best {
            Some((_, popularity)) if track.popularity <= popularity => best,
            _ => Some((position, track.popularity)),
        })
        .map(|(position, _)| position)
}

/// Exact match first, then substring.
pub(crate) fn default_matchers() -> Vec<Box<dyn TitleMatcher>> {
    vec![Box::new(ExactMatcher), Box::new(SubstringMatcher)]
}
