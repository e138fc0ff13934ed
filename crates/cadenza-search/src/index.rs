use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;

use cadenza_core::FeatureMatrix;

use crate::distance::{distance_with_norms, norm};
use crate::error::{IndexError, IndexResult};

/// One search hit: a catalog position and its distance from the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub position: usize,
    /// Cosine distance in `[0, 2]`.
    pub distance: f64,
}

impl Neighbor {
    /// Ascending distance, then ascending position.
    fn cmp_rank(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.position.cmp(&other.position))
    }
}

/// Brute-force cosine index over a feature matrix.
///
/// The index owns the matrix it was built from and is read-only after
/// construction. It serializes as the bare matrix; row norms are recomputed
/// on load.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    matrix: FeatureMatrix,
    norms: Vec<f64>,
}

impl SimilarityIndex {
    /// Build an index over every row of `matrix`.
    ///
    /// # Errors
    /// Returns `IndexError::EmptyMatrix` when the matrix has no rows.
    pub fn build(matrix: FeatureMatrix) -> IndexResult<Self> {
        if matrix.is_empty() {
            return Err(IndexError::EmptyMatrix);
        }
        let norms = matrix.iter_rows().map(norm).collect();
        log::debug!(
            "Built similarity index: {} rows x {} columns",
            matrix.rows(),
            matrix.cols()
        );
        Ok(Self { matrix, norms })
    }

    #[must_use]
    pub const fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.matrix.rows()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.matrix.rows() == 0
    }

    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.matrix.cols()
    }

    /// The `k` rows closest to `vector`, nearest first.
    ///
    /// Returns `min(k, len)` neighbors. `vector` must use the column layout
    /// of the indexed matrix.
    #[must_use]
    pub fn query(&self, vector: &[f64], k: usize) -> Vec<Neighbor> {
        debug_assert_eq!(vector.len(), self.dimensions());

        let k = k.min(self.len());
        if k == 0 {
            return Vec::new();
        }

        let query_norm = norm(vector);
        let mut neighbors: Vec<Neighbor> = self
            .matrix
            .iter_rows()
            .zip(&self.norms)
            .enumerate()
            .map(|(position, (row, row_norm))| Neighbor {
                position,
                distance: distance_with_norms(vector, query_norm, row, *row_norm),
            })
            .collect();

        if k < neighbors.len() {
            neighbors.select_nth_unstable_by(k - 1, Neighbor::cmp_rank);
            neighbors.truncate(k);
        }
        neighbors.sort_by(Neighbor::cmp_rank);
        neighbors
    }

    /// The `k` rows closest to the stored row at `position`.
    ///
    /// The row itself is included (normally first, at distance 0).
    ///
    /// # Errors
    /// Returns `IndexError::PositionOutOfRange` for an unknown position.
    pub fn query_row(&self, position: usize, k: usize) -> IndexResult<Vec<Neighbor>> {
        let row = self
            .matrix
            .row(position)
            .ok_or(IndexError::PositionOutOfRange {
                position,
                rows: self.len(),
            })?;
        Ok(self.query(row, k))
    }
}

impl Serialize for SimilarityIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.matrix.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SimilarityIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let matrix = FeatureMatrix::deserialize(deserializer)?;
        Self::build(matrix).map_err(serde::de::Error::custom)
    }
}
