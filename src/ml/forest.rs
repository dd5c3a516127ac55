//! Random forest classifier
//!
//! Bagged Gini trees built in parallel with rayon. Tree seeds derive
//! from the forest seed (`seed.wrapping_add(tree_index)`), so a fixed
//! seed gives a bit-identical forest regardless of thread scheduling.

use super::error::{MlError, MlResult};
use super::tree::{DecisionTree, TreeConfig};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

/// Random forest parameters. `Default` mirrors the common library
/// defaults; [`ForestConfig::tuned`] is the configuration that performed
/// best on the BTC direction task.
#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Number of trees
    pub n_trees: usize,
    /// Per-tree depth cap; `None` grows to purity
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features per split; `None` resolves to `ceil(sqrt(n_features))`
    pub max_features: Option<usize>,
    /// Sample each tree's training set with replacement
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 69,
        }
    }
}

impl ForestConfig {
    /// Tuned configuration: shallow regularized trees
    pub fn tuned() -> Self {
        Self {
            n_trees: 100,
            max_depth: Some(8),
            min_samples_split: 50,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
            seed: 69,
        }
    }
}

/// Random forest model
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// Build the forest. Individual bootstrap samples may collapse to a
    /// single class; the input as a whole must carry both.
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
        let positives = y.iter().filter(|&&v| v > 0.5).count();
        if positives == 0 || positives == y.len() {
            return Err(MlError::SingleClass);
        }
        if self.config.n_trees == 0 {
            return Err(MlError::InvalidParameter("n_trees must be positive".into()));
        }

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features);

        let trees: MlResult<Vec<DecisionTree>> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_seed = self.config.seed.wrapping_add(i as u64);
                let tree_config = TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed: tree_seed,
                };

                let mut tree = DecisionTree::new(tree_config);

                if self.config.bootstrap {
                    let indices = bootstrap_indices(n_samples, tree_seed);
                    let xb = x.select(Axis(0), &indices);
                    let yb = y.select(Axis(0), &indices);
                    tree.fit(&xb, &yb)?;
                } else {
                    tree.fit(x, y)?;
                }

                Ok(tree)
            })
            .collect();
        self.trees = trees?;

        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &importance) in tree.feature_importances().iter().enumerate() {
                self.feature_importances[i] += importance;
            }
        }
        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for importance in &mut self.feature_importances {
                *importance /= total;
            }
        }

        debug!(
            n_trees = self.trees.len(),
            max_features, "random forest fitted"
        );
        Ok(())
    }

    /// Probability of the positive class, averaged over the trees
    pub fn predict_proba(&self, x: &Array2<f64>) -> MlResult<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(MlError::NotFitted);
        }

        let mut total = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            total = total + tree.predict_proba(x)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    /// Predicted labels (0.0 / 1.0) by averaged-probability vote
    pub fn predict(&self, x: &Array2<f64>) -> MlResult<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    /// Normalized impurity-gain importances, one per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Feature names paired with importances, most important first
    pub fn feature_importance_ranking<'a>(&self, names: &'a [String]) -> Vec<(&'a str, f64)> {
        let mut ranking: Vec<(&str, f64)> = names
            .iter()
            .zip(self.feature_importances.iter())
            .map(|(n, &i)| (n.as_str(), i))
            .collect();

        ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranking
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// `n` indices drawn with replacement from `0..n`
fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}
