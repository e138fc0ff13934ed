//! The positional track catalog.
//!
//! A track's position in the catalog is the join key between the catalog,
//! the feature matrix, and the similarity index. Positions are assigned once
//! when the catalog is built and never change afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::model::Track;

/// Ordered, immutable sequence of tracks indexed `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Build a catalog from tracks in their final order.
    ///
    /// # Errors
    /// Returns `Error::InvalidData` if two tracks share a `track_id`.
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(tracks.len());
        for track in &tracks {
            if !seen.insert(&track.track_id) {
                return Err(Error::InvalidData(format!(
                    "duplicate track_id in catalog: {}",
                    track.track_id
                )));
            }
        }
        Ok(Self { tracks })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The track at `position`, if any.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Track> {
        self.tracks.get(position)
    }

    /// Iterate tracks with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Track)> {
        self.tracks.iter().enumerate()
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, genre: &str) -> Track {
        Track::new(id, "Artist", format!("Song {id}"), genre)
    }

    #[test]
    fn test_catalog_positions_follow_input_order() {
        let catalog = Catalog::new(vec![track("a", "rock"), track("b", "pop")]).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().track_id.as_str(), "a");
        assert_eq!(catalog.get(1).unwrap().track_id.as_str(), "b");
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn test_catalog_rejects_duplicate_ids() {
        let result = Catalog::new(vec![track("a", "rock"), track("a", "pop")]);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new(Vec::new()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.iter().count(), 0);
    }
}
