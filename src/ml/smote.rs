//! SMOTE minority-class oversampling
//!
//! Balances a training set by synthesizing minority-class samples:
//! each synthetic point is a convex combination of a minority row and one
//! of its k nearest minority neighbors (Euclidean). Original rows are
//! preserved in order; synthetic rows are appended after them. The test
//! split never passes through here.

use super::dataset::Dataset;
use super::error::{MlError, MlResult};
use ndarray::{Array1, Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// SMOTE parameters
#[derive(Debug, Clone)]
pub struct SmoteConfig {
    /// Candidate neighbors per minority row; clamped to the minority size
    pub k_neighbors: usize,
    /// RNG seed for base-row, neighbor, and interpolation draws
    pub seed: u64,
}

impl Default for SmoteConfig {
    fn default() -> Self {
        Self {
            k_neighbors: 5,
            seed: 69,
        }
    }
}

/// Minority oversampler
pub struct Smote {
    config: SmoteConfig,
}

impl Default for Smote {
    fn default() -> Self {
        Self::new()
    }
}

impl Smote {
    pub fn new() -> Self {
        Self {
            config: SmoteConfig::default(),
        }
    }

    pub fn with_config(config: SmoteConfig) -> Self {
        Self { config }
    }

    /// Oversample the minority class to exactly the majority count.
    ///
    /// An already balanced set is returned unchanged. A single-class set
    /// or a minority class below two samples cannot be oversampled and is
    /// an error. Synthetic rows carry the date of their base row.
    pub fn balance(&self, dataset: &Dataset) -> MlResult<Dataset> {
        if dataset.n_samples() == 0 {
            return Err(MlError::EmptyTrainingSet);
        }

        let (n_zero, n_one) = dataset.class_counts();
        if n_zero == 0 || n_one == 0 {
            return Err(MlError::SingleClass);
        }
        if n_zero == n_one {
            return Ok(dataset.clone());
        }

        let minority_label = if n_zero < n_one { 0.0 } else { 1.0 };
        let n_minority = n_zero.min(n_one);
        let n_synthetic = n_zero.max(n_one) - n_minority;

        if n_minority < 2 {
            return Err(MlError::MinorityTooSmall { n_minority });
        }

        let minority_indices: Vec<usize> = dataset
            .y
            .iter()
            .enumerate()
            .filter(|(_, &y)| y == minority_label)
            .map(|(i, _)| i)
            .collect();

        let k = self.config.k_neighbors.min(n_minority - 1);
        let neighbors = nearest_neighbors(&dataset.x, &minority_indices, k);

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let n_features = dataset.n_features();

        let mut x = dataset.x.clone();
        let mut y = dataset.y.to_vec();
        let mut dates = dataset.dates.clone();

        for _ in 0..n_synthetic {
            let base_pos = rng.gen_range(0..n_minority);
            let base = dataset.x.row(minority_indices[base_pos]);

            let neighbor_idx = neighbors[base_pos][rng.gen_range(0..k)];
            let neighbor = dataset.x.row(neighbor_idx);

            let u: f64 = rng.gen();
            let synthetic: Array1<f64> = (0..n_features)
                .map(|j| base[j] + u * (neighbor[j] - base[j]))
                .collect();

            x.push_row(synthetic.view())
                .map_err(|_| MlError::DimensionMismatch {
                    expected: n_features,
                    got: synthetic.len(),
                })?;
            y.push(minority_label);
            dates.push(dataset.dates[minority_indices[base_pos]]);
        }

        debug!(
            n_synthetic,
            minority_label, "oversampled minority class to majority count"
        );

        Ok(Dataset {
            x,
            y: Array1::from_vec(y),
            feature_names: dataset.feature_names.clone(),
            dates,
        })
    }
}

/// For each minority row, the dataset indices of its k nearest minority
/// neighbors (excluding itself), nearest first. Distance ties break on
/// the lower index so results do not depend on sort internals.
fn nearest_neighbors(x: &Array2<f64>, minority_indices: &[usize], k: usize) -> Vec<Vec<usize>> {
    minority_indices
        .iter()
        .map(|&i| {
            let mut distances: Vec<(f64, usize)> = minority_indices
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| (euclidean(x.row(i), x.row(j)), j))
                .collect();

            distances.sort_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.1.cmp(&b.1))
            });

            distances.into_iter().take(k).map(|(_, j)| j).collect()
        })
        .collect()
}

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ndarray::array;

    fn dataset(x: Array2<f64>, y: Vec<f64>) -> Dataset {
        let start: NaiveDate = "2020-01-01".parse().unwrap();
        let dates = (0..y.len())
            .map(|i| start + chrono::Days::new(i as u64))
            .collect();
        Dataset {
            x,
            y: Array1::from_vec(y),
            feature_names: vec!["f1".to_string(), "f2".to_string()],
            dates,
        }
    }

    fn imbalanced() -> Dataset {
        // 6 zeros clustered near the origin, 3 ones near (10, 10)
        dataset(
            array![
                [0.0, 0.1],
                [0.2, 0.0],
                [0.1, 0.3],
                [0.3, 0.2],
                [0.0, 0.4],
                [0.4, 0.1],
                [10.0, 10.2],
                [10.3, 10.0],
                [10.1, 10.4],
            ],
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        )
    }

    #[test]
    fn test_balance_equalizes_class_counts() {
        let balanced = Smote::new().balance(&imbalanced()).unwrap();

        assert_eq!(balanced.class_counts(), (6, 6));
        assert_eq!(balanced.n_samples(), 12);
    }

    #[test]
    fn test_originals_preserved_synthetics_appended() {
        let original = imbalanced();
        let balanced = Smote::new().balance(&original).unwrap();

        for i in 0..original.n_samples() {
            assert_eq!(balanced.x.row(i), original.x.row(i));
            assert_eq!(balanced.y[i], original.y[i]);
        }
        // appended rows all carry the minority label
        for i in original.n_samples()..balanced.n_samples() {
            assert_eq!(balanced.y[i], 1.0);
        }
    }

    #[test]
    fn test_synthetics_interpolate_minority_cluster() {
        let balanced = Smote::new().balance(&imbalanced()).unwrap();

        // convex combinations stay inside the minority bounding box
        for i in 9..balanced.n_samples() {
            let row = balanced.x.row(i);
            assert!((10.0..=10.3).contains(&row[0]), "x out of range: {}", row[0]);
            assert!((10.0..=10.4).contains(&row[1]), "y out of range: {}", row[1]);
        }
    }

    #[test]
    fn test_seeded_determinism() {
        let original = imbalanced();
        let a = Smote::new().balance(&original).unwrap();
        let b = Smote::new().balance(&original).unwrap();
        assert_eq!(a, b);

        let c = Smote::with_config(SmoteConfig {
            k_neighbors: 5,
            seed: 70,
        })
        .balance(&original)
        .unwrap();
        assert_ne!(a.x, c.x);
    }

    #[test]
    fn test_balanced_input_is_unchanged() {
        let original = dataset(
            array![[0.0, 0.0], [1.0, 1.0], [10.0, 10.0], [11.0, 11.0]],
            vec![0.0, 0.0, 1.0, 1.0],
        );
        let balanced = Smote::new().balance(&original).unwrap();
        assert_eq!(balanced, original);
    }

    #[test]
    fn test_single_class_is_error() {
        let original = dataset(array![[0.0, 0.0], [1.0, 1.0]], vec![0.0, 0.0]);
        assert!(matches!(
            Smote::new().balance(&original),
            Err(MlError::SingleClass)
        ));
    }

    #[test]
    fn test_tiny_minority_is_error() {
        let original = dataset(
            array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [10.0, 10.0]],
            vec![0.0, 0.0, 0.0, 1.0],
        );
        assert!(matches!(
            Smote::new().balance(&original),
            Err(MlError::MinorityTooSmall { n_minority: 1 })
        ));
    }

    #[test]
    fn test_neighbor_k_clamped_to_minority_size() {
        // minority of 2: only 1 possible neighbor even though k defaults to 5
        let original = dataset(
            array![
                [0.0, 0.0],
                [1.0, 1.0],
                [2.0, 2.0],
                [3.0, 3.0],
                [10.0, 10.0],
                [10.5, 10.5]
            ],
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0],
        );
        let balanced = Smote::new().balance(&original).unwrap();
        assert_eq!(balanced.class_counts(), (4, 4));
    }
}
