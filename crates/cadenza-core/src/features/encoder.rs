use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder over the categories seen at fit time.
///
/// Categories are kept sorted. A value that was not seen during fitting
/// encodes to an all-zero vector instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<String>,
}

impl OneHotEncoder {
    #[must_use]
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories = values
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        Self { categories }
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of output columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Column index of a known category.
    #[must_use]
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }

    #[must_use]
    pub fn encode(&self, value: &str) -> Vec<f64> {
        let mut encoded = vec![0.0; self.width()];
        if let Some(idx) = self.index_of(value) {
            encoded[idx] = 1.0;
        }
        encoded
    }
}
