//! CART classification tree
//!
//! Binary Gini trees with midpoint thresholds, used standalone and as the
//! base learner of the random forest. Splits are searched over a seeded
//! shuffle of the feature indices so per-node feature subsetting
//! (`max_features`) is reproducible.

use super::error::{MlError, MlResult};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Decision tree parameters. Defaults mirror the common library defaults:
/// unbounded depth, split nodes of two or more samples, single-sample
/// leaves allowed, all features considered at every split.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Maximum split depth; `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs to be split
    pub min_samples_split: usize,
    /// Minimum samples either child of a split must keep
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` = all
    pub max_features: Option<usize>,
    /// Seed for the per-split feature shuffle
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 69,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        /// Fraction of positive-label samples in the node
        prob: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    fn min_leaf_size(&self) -> usize {
        match self {
            Node::Leaf { n_samples, .. } => *n_samples,
            Node::Split { left, right, .. } => left.min_leaf_size().min(right.min_leaf_size()),
        }
    }
}

/// Decision tree classifier
#[derive(Debug, Clone)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<Node>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Grow the tree. A single-class input is legal and produces a
    /// single pure leaf; bootstrap samples inside a forest can be that
    /// degenerate without failing the whole ensemble.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> MlResult<()> {
        if x.nrows() == 0 {
            return Err(MlError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(MlError::LengthMismatch {
                n_rows: x.nrows(),
                n_labels: y.len(),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(MlError::NonFinite("feature matrix"));
        }

        self.n_features = x.ncols();
        self.feature_importances = vec![0.0; self.n_features];

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build(x, y, &indices, 0, &mut rng));

        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for importance in &mut self.feature_importances {
                *importance /= total;
            }
        }

        Ok(())
    }

    fn build(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let n = indices.len();
        let prob = positive_fraction(y, indices);
        let impurity = gini(prob);

        let depth_reached = self.config.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || n < self.config.min_samples_split || impurity < 1e-10 {
            return Node::Leaf {
                prob,
                n_samples: n,
            };
        }

        match self.find_best_split(x, y, indices, impurity, rng) {
            Some((feature_idx, threshold, left_idx, right_idx, gain)) => {
                self.feature_importances[feature_idx] += gain * n as f64;

                let left = self.build(x, y, &left_idx, depth + 1, rng);
                let right = self.build(x, y, &right_idx, depth + 1, rng);

                Node::Split {
                    feature_idx,
                    threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            None => Node::Leaf {
                prob,
                n_samples: n,
            },
        }
    }

    /// Best (feature, threshold) over a shuffled feature subset, trying
    /// midpoints of consecutive unique values. Returns the child index
    /// sets and the impurity gain; `None` when no split improves on the
    /// parent while honoring `min_samples_leaf`.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>, f64)> {
        let max_features = self.config.max_features.unwrap_or(self.n_features);

        let mut feature_indices: Vec<usize> = (0..self.n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let mut best_gain = 0.0;
        let mut best_split = None;

        for &feature_idx in &feature_indices {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, feature_idx]] <= threshold);

                if left_idx.len() < self.config.min_samples_leaf
                    || right_idx.len() < self.config.min_samples_leaf
                {
                    continue;
                }

                let left_impurity = gini(positive_fraction(y, &left_idx));
                let right_impurity = gini(positive_fraction(y, &right_idx));

                let n_left = left_idx.len() as f64;
                let n_right = right_idx.len() as f64;
                let weighted = (n_left * left_impurity + n_right * right_impurity)
                    / (n_left + n_right);
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best_split = Some((feature_idx, threshold, left_idx, right_idx, gain));
                }
            }
        }

        best_split
    }

    fn prob_row(node: &Node, features: ArrayView1<f64>) -> f64 {
        match node {
            Node::Leaf { prob, .. } => *prob,
            Node::Split {
                feature_idx,
                threshold,
                left,
                right,
            } => {
                if features[*feature_idx] <= *threshold {
                    Self::prob_row(left, features)
                } else {
                    Self::prob_row(right, features)
                }
            }
        }
    }

    /// Probability of the positive class per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> MlResult<Array1<f64>> {
        let root = self.root.as_ref().ok_or(MlError::NotFitted)?;
        if x.ncols() != self.n_features {
            return Err(MlError::DimensionMismatch {
                expected: self.n_features,
                got: x.ncols(),
            });
        }

        Ok(x.rows()
            .into_iter()
            .map(|row| Self::prob_row(root, row))
            .collect())
    }

    /// Predicted labels (0.0 / 1.0); an exactly even leaf votes 0
    pub fn predict(&self, x: &Array2<f64>) -> MlResult<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    /// Normalized impurity-gain importances, one per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Tree depth in nodes (a lone leaf has depth 1)
    pub fn depth(&self) -> usize {
        self.root.as_ref().map(Node::depth).unwrap_or(0)
    }

    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map(Node::n_leaves).unwrap_or(0)
    }

    #[cfg(test)]
    fn min_leaf_size(&self) -> usize {
        self.root.as_ref().map(Node::min_leaf_size).unwrap_or(0)
    }
}

fn positive_fraction(y: &Array1<f64>, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let positives = indices.iter().filter(|&&i| y[i] > 0.5).count();
    positives as f64 / indices.len() as f64
}

/// Binary Gini impurity `2p(1-p)`
fn gini(p: f64) -> f64 {
    2.0 * p * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threshold_data() -> (Array2<f64>, Array1<f64>) {
        // separable at x = 5.0 with a noisy second feature
        let n = 100;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                i as f64 / 10.0
            } else {
                (i as f64 * 0.37).sin()
            }
        });
        let y = Array1::from_shape_fn(n, |i| if i as f64 / 10.0 > 5.0 { 1.0 } else { 0.0 });
        (x, y)
    }

    #[test]
    fn test_learns_threshold() {
        let (x, y) = threshold_data();
        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| p == a)
            .count();
        assert!(correct as f64 / y.len() as f64 > 0.95);
    }

    #[test]
    fn test_max_depth_bounds_tree() {
        let (x, y) = threshold_data();
        let mut tree = DecisionTree::new(TreeConfig {
            max_depth: Some(2),
            ..Default::default()
        });
        tree.fit(&x, &y).unwrap();

        // at most two split levels above the leaves
        assert!(tree.depth() <= 3);
    }

    #[test]
    fn test_min_samples_leaf_honored() {
        let (x, y) = threshold_data();
        let mut tree = DecisionTree::new(TreeConfig {
            min_samples_leaf: 10,
            ..Default::default()
        });
        tree.fit(&x, &y).unwrap();

        assert!(tree.min_leaf_size() >= 10);
    }

    #[test]
    fn test_single_class_grows_pure_leaf() {
        let x = Array2::from_shape_fn((10, 2), |(i, j)| (i + j) as f64);
        let y = Array1::from_elem(10, 1.0);

        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.n_leaves(), 1);
        assert!(tree.predict(&x).unwrap().iter().all(|&p| p == 1.0));
    }

    #[test]
    fn test_seeded_fit_is_deterministic() {
        let (x, y) = threshold_data();

        let mut a = DecisionTree::new(TreeConfig {
            max_features: Some(1),
            ..Default::default()
        });
        let mut b = DecisionTree::new(TreeConfig {
            max_features: Some(1),
            ..Default::default()
        });
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
        assert_eq!(a.feature_importances(), b.feature_importances());
    }

    #[test]
    fn test_importances_normalized() {
        let (x, y) = threshold_data();
        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&x, &y).unwrap();

        let sum: f64 = tree.feature_importances().iter().sum();
        assert!((sum - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let tree = DecisionTree::new(TreeConfig::default());
        assert!(matches!(
            tree.predict(&Array2::zeros((1, 2))),
            Err(MlError::NotFitted)
        ));
    }
}
