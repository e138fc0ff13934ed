//! Column scalers fitted on the full catalog.
//!
//! Both scalers are fitted by construction: there is no unfitted state, so
//! transforming can never fail for lack of a prior `fit`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Variance below this is treated as a constant column.
const MIN_SPREAD: f64 = 1e-10;

/// Standardizes columns to zero mean and unit variance.
///
/// Uses the population standard deviation (divide by `n`). Constant columns
/// are centered but left unscaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    /// Fit per-column mean and standard deviation.
    ///
    /// # Errors
    /// Returns `Error::EmptyDataset` for zero rows and `Error::InvalidData`
    /// when rows have differing widths.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = row_width(rows)?;
        let n = rows.len() as f64;

        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut std = vec![0.0; width];
        for row in rows {
            for ((s, v), m) in std.iter_mut().zip(row).zip(&mean) {
                let diff = v - m;
                *s += diff * diff;
            }
        }
        for s in &mut std {
            *s = (*s / n).sqrt();
        }

        Ok(Self { mean, std })
    }

    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    #[must_use]
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Number of columns this scaler was fitted on.
    #[must_use]
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one row. `row` must have the fitted width.
    #[must_use]
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(v, (m, s))| {
                let centered = v - m;
                if *s > MIN_SPREAD {
                    centered / s
                } else {
                    centered
                }
            })
            .collect()
    }
}

/// Scales columns linearly onto `[0, 1]` using the fitted min and max.
///
/// Constant columns map to 0. Values outside the fitted range are not
/// clipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: Vec<f64>,
    data_max: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit per-column minimum and maximum.
    ///
    /// # Errors
    /// Same conditions as [`StandardScaler::fit`].
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = row_width(rows)?;
        let mut data_min = vec![f64::INFINITY; width];
        let mut data_max = vec![f64::NEG_INFINITY; width];

        for row in rows {
            for (j, &v) in row.iter().enumerate() {
                data_min[j] = data_min[j].min(v);
                data_max[j] = data_max[j].max(v);
            }
        }

        Ok(Self { data_min, data_max })
    }

    #[must_use]
    pub fn data_min(&self) -> &[f64] {
        &self.data_min
    }

    #[must_use]
    pub fn data_max(&self) -> &[f64] {
        &self.data_max
    }

    #[must_use]
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.data_min.iter().zip(&self.data_max))
            .map(|(v, (lo, hi))| {
                let range = hi - lo;
                if range.abs() > MIN_SPREAD {
                    (v - lo) / range
                } else {
                    0.0
                }
            })
            .collect()
    }
}

fn row_width(rows: &[Vec<f64>]) -> Result<usize> {
    let first = rows.first().ok_or(Error::EmptyDataset)?;
    let width = first.len();
    if rows.iter().any(|r| r.len() != width) {
        return Err(Error::InvalidData(
            "cannot fit scaler on rows of differing width".to_string(),
        ));
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_standard_scaler_zero_mean_unit_variance() {
        let rows = vec![vec![1.0, 100.0], vec![2.0, 200.0], vec![3.0, 300.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();

        assert!(close(scaler.mean()[0], 2.0));
        assert!(close(scaler.mean()[1], 200.0));

        let scaled: Vec<Vec<f64>> = rows.iter().map(|r| scaler.transform_row(r)).collect();
        for j in 0..2 {
            let mean: f64 = scaled.iter().map(|r| r[j]).sum::<f64>() / 3.0;
            let var: f64 = scaled.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / 3.0;
            assert!(close(mean, 0.0));
            assert!(close(var, 1.0));
        }
    }

    #[test]
    fn test_standard_scaler_constant_column_is_centered_only() {
        let rows = vec![vec![5.0], vec![5.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.transform_row(&[5.0]), vec![0.0]);
        assert_eq!(scaler.transform_row(&[7.0]), vec![2.0]);
    }

    #[test]
    fn test_standard_scaler_empty_rows() {
        assert!(matches!(StandardScaler::fit(&[]), Err(Error::EmptyDataset)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            StandardScaler::fit(&rows),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_min_max_scaler_unit_range() {
        let rows = vec![vec![10.0], vec![20.0], vec![60.0]];
        let scaler = MinMaxScaler::fit(&rows).unwrap();
        assert_eq!(scaler.transform_row(&[10.0]), vec![0.0]);
        assert_eq!(scaler.transform_row(&[60.0]), vec![1.0]);
        assert!(close(scaler.transform_row(&[35.0])[0], 0.5));
    }

    #[test]
    fn test_min_max_scaler_constant_column() {
        let rows = vec![vec![42.0], vec![42.0]];
        let scaler = MinMaxScaler::fit(&rows).unwrap();
        assert_eq!(scaler.transform_row(&[42.0]), vec![0.0]);
    }
}
