//! Dataset construction and splitting
//!
//! Builds feature matrices from labeled rows, keeping only rows whose
//! selected feature columns are all defined, and provides the seeded
//! random split used downstream plus a chronological alternative.
//!
//! The random split shuffles a time series, so adjacent days sharing
//! rolling-window history can land on opposite sides of the split. It is
//! kept because it is what the evaluated results are based on; use
//! [`Dataset::chronological_split`] to avoid that leakage.

use super::error::{MlError, MlResult};
use crate::features::LabeledRow;
use chrono::NaiveDate;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Feature columns fed to a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSet {
    /// Daily return and rolling volatility
    Base,
    /// Base plus lagged returns and the close/rolling-mean ratio
    Extended,
}

impl FeatureSet {
    pub fn names(&self) -> Vec<String> {
        let base = ["daily_return", "volatility_30d"];
        let extended = ["return_lag_1", "return_lag_2", "close_sma_ratio"];
        match self {
            FeatureSet::Base => base.iter().map(|s| s.to_string()).collect(),
            FeatureSet::Extended => base
                .iter()
                .chain(extended.iter())
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn values(&self, row: &LabeledRow) -> Vec<f64> {
        let r = &row.row;
        match self {
            FeatureSet::Base => vec![r.daily_return, r.volatility],
            FeatureSet::Extended => vec![
                r.daily_return,
                r.volatility,
                r.return_lag_1,
                r.return_lag_2,
                r.close_sma_ratio,
            ],
        }
    }
}

/// Feature matrix, labels, and row dates
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Feature matrix (n_samples x n_features)
    pub x: Array2<f64>,
    /// Binary labels encoded 0.0 / 1.0
    pub y: Array1<f64>,
    /// Feature names, in column order
    pub feature_names: Vec<String>,
    /// Date of each row
    pub dates: Vec<NaiveDate>,
}

/// Train/test split result
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

impl Dataset {
    pub fn new(
        x: Array2<f64>,
        y: Array1<f64>,
        feature_names: Vec<String>,
        dates: Vec<NaiveDate>,
    ) -> MlResult<Self> {
        if x.nrows() != y.len() {
            return Err(MlError::LengthMismatch {
                n_rows: x.nrows(),
                n_labels: y.len(),
            });
        }
        if x.ncols() != feature_names.len() {
            return Err(MlError::DimensionMismatch {
                expected: feature_names.len(),
                got: x.ncols(),
            });
        }
        Ok(Self {
            x,
            y,
            feature_names,
            dates,
        })
    }

    /// Build a dataset from labeled rows, keeping only rows where every
    /// selected feature column is defined. Row order is preserved.
    pub fn from_labeled(rows: &[LabeledRow], feature_set: FeatureSet) -> Self {
        let feature_names = feature_set.names();
        let n_features = feature_names.len();

        let mut x_data = Vec::new();
        let mut y_data = Vec::new();
        let mut dates = Vec::new();

        for row in rows {
            let values = feature_set.values(row);
            if values.iter().all(|v| v.is_finite()) {
                x_data.extend_from_slice(&values);
                y_data.push(row.label.as_f64());
                dates.push(row.row.date);
            }
        }

        let n_samples = y_data.len();
        // shape is consistent by construction
        let x = Array2::from_shape_vec((n_samples, n_features), x_data)
            .unwrap_or_else(|_| Array2::zeros((0, n_features)));

        Self {
            x,
            y: Array1::from_vec(y_data),
            feature_names,
            dates,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Count of (label 0, label 1) rows
    pub fn class_counts(&self) -> (usize, usize) {
        let positives = self.y.iter().filter(|&&v| v > 0.5).count();
        (self.y.len() - positives, positives)
    }

    /// Rows selected by index, in the given order
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
            dates: indices.iter().map(|&i| self.dates[i]).collect(),
        }
    }

    /// Seeded shuffle split.
    ///
    /// Shuffles row indices with a `ChaCha8Rng` seeded from `seed`, takes
    /// the first `test_ratio * n` rows as the test set and the rest as
    /// training. Identical inputs and seed give an identical split.
    pub fn random_split(&self, test_ratio: f64, seed: u64) -> MlResult<Split> {
        if !(0.0..1.0).contains(&test_ratio) || test_ratio == 0.0 {
            return Err(MlError::InvalidParameter(format!(
                "test_ratio must be in (0, 1), got {test_ratio}"
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);

        let test_size = (test_ratio * n as f64) as usize;
        let (test_indices, train_indices) = indices.split_at(test_size);

        Ok(Split {
            train: self.subset(train_indices),
            test: self.subset(test_indices),
        })
    }

    /// Split by position: the earliest `1 - test_ratio` of rows train, the
    /// rest test. No future rows leak into training.
    pub fn chronological_split(&self, test_ratio: f64) -> MlResult<Split> {
        if !(0.0..1.0).contains(&test_ratio) || test_ratio == 0.0 {
            return Err(MlError::InvalidParameter(format!(
                "test_ratio must be in (0, 1), got {test_ratio}"
            )));
        }

        let n = self.n_samples();
        let train_size = ((1.0 - test_ratio) * n as f64) as usize;
        let indices: Vec<usize> = (0..n).collect();
        let (train_indices, test_indices) = indices.split_at(train_size);

        Ok(Split {
            train: self.subset(train_indices),
            test: self.subset(test_indices),
        })
    }
}

/// Per-column z-score scaling, fit on training data only
#[derive(Debug, Clone)]
pub struct Standardizer {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl Standardizer {
    /// Learn column means and standard deviations from `x`
    pub fn fit(x: &Array2<f64>) -> MlResult<Self> {
        if x.nrows() == 0 {
            return Err(MlError::EmptyTrainingSet);
        }

        let means = x.mean_axis(Axis(0)).ok_or(MlError::EmptyTrainingSet)?;
        let stds = x.std_axis(Axis(0), 0.0);
        // constant columns pass through unscaled
        let stds = stds.mapv(|s| if s > 1e-12 { s } else { 1.0 });

        Ok(Self { means, stds })
    }

    /// Apply the learned scaling
    pub fn transform(&self, x: &Array2<f64>) -> MlResult<Array2<f64>> {
        if x.ncols() != self.means.len() {
            return Err(MlError::DimensionMismatch {
                expected: self.means.len(),
                got: x.ncols(),
            });
        }
        Ok((x - &self.means) / &self.stds)
    }
}
