//! Model variant training and evaluation
//!
//! Runs the model progression over a labeled series: an unbalanced
//! logistic baseline, a SMOTE-balanced logistic, and untuned/tuned
//! random forests. Every variant shares the same split so their reports
//! are comparable, and the seed is threaded explicitly through the
//! split, the balancer, and the forest.

use super::dataset::{Dataset, FeatureSet, Split, Standardizer};
use super::error::MlResult;
use super::forest::{ForestConfig, RandomForest};
use super::logistic::LogisticRegression;
use super::metrics::Evaluation;
use super::smote::{Smote, SmoteConfig};
use crate::features::LabeledRow;
use tracing::info;

/// The four model variants of the analysis, in training order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    /// Logistic regression on the unbalanced training split
    Baseline,
    /// Logistic regression on the SMOTE-balanced training split
    BalancedLogistic,
    /// Untuned random forest on balanced extended features
    Forest,
    /// Regularized random forest on balanced extended features
    TunedForest,
}

impl ModelVariant {
    pub fn all() -> [ModelVariant; 4] {
        [
            ModelVariant::Baseline,
            ModelVariant::BalancedLogistic,
            ModelVariant::Forest,
            ModelVariant::TunedForest,
        ]
    }

    /// Artifact key: reports are written to
    /// `classification_report_<key>.txt` and confusion matrices to
    /// `confusion_matrix_<key>.png`.
    pub fn key(self) -> &'static str {
        match self {
            ModelVariant::Baseline => "initial",
            ModelVariant::BalancedLogistic => "balanced",
            ModelVariant::Forest => "rf",
            ModelVariant::TunedForest => "rf_improved_v2",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ModelVariant::Baseline => "Logistic Regression (unbalanced)",
            ModelVariant::BalancedLogistic => "Logistic Regression (SMOTE)",
            ModelVariant::Forest => "Random Forest (SMOTE)",
            ModelVariant::TunedForest => "Tuned Random Forest (SMOTE)",
        }
    }

    /// Parse an artifact key back into a variant
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "initial" => Some(ModelVariant::Baseline),
            "balanced" => Some(ModelVariant::BalancedLogistic),
            "rf" => Some(ModelVariant::Forest),
            "rf_improved_v2" => Some(ModelVariant::TunedForest),
            _ => None,
        }
    }

    /// Logistic variants use the base columns; forests get the extended set
    fn feature_set(self) -> FeatureSet {
        match self {
            ModelVariant::Baseline | ModelVariant::BalancedLogistic => FeatureSet::Base,
            ModelVariant::Forest | ModelVariant::TunedForest => FeatureSet::Extended,
        }
    }

    /// Whether the training split is balanced before fitting
    fn balances(self) -> bool {
        !matches!(self, ModelVariant::Baseline)
    }
}

/// Split and seed parameters shared by every variant
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub test_ratio: f64,
    /// Seed threaded through splitting, balancing, and forest building
    pub seed: u64,
    /// Hold out the latest rows instead of a seeded shuffle. The shuffle
    /// split matches the reported results but leaks adjacent-day window
    /// history across the split; this avoids that.
    pub chronological: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 69,
            chronological: false,
        }
    }
}

/// One fitted and evaluated variant
#[derive(Debug, Clone)]
pub struct VariantOutcome {
    pub variant: ModelVariant,
    pub evaluation: Evaluation,
    /// Training rows after any balancing
    pub n_train: usize,
    pub n_test: usize,
    /// Feature names with importances, most important first; forests only
    pub feature_importances: Option<Vec<(String, f64)>>,
}

/// Train one variant on the labeled rows and evaluate it on the held-out
/// split. The test split never passes through the balancer, so its class
/// distribution stays as observed.
pub fn run_variant(
    rows: &[LabeledRow],
    variant: ModelVariant,
    config: &TrainerConfig,
) -> MlResult<VariantOutcome> {
    let dataset = Dataset::from_labeled(rows, variant.feature_set());
    let Split { train, test } = if config.chronological {
        dataset.chronological_split(config.test_ratio)?
    } else {
        dataset.random_split(config.test_ratio, config.seed)?
    };

    let train = if variant.balances() {
        let smote = Smote::with_config(SmoteConfig {
            seed: config.seed,
            ..SmoteConfig::default()
        });
        smote.balance(&train)?
    } else {
        train
    };

    let (n_zero, n_one) = train.class_counts();
    info!(
        variant = variant.key(),
        n_train = train.n_samples(),
        n_test = test.n_samples(),
        train_zeros = n_zero,
        train_ones = n_one,
        "fitting"
    );

    let (evaluation, feature_importances) = match variant {
        ModelVariant::Baseline | ModelVariant::BalancedLogistic => {
            let scaler = Standardizer::fit(&train.x)?;
            let x_train = scaler.transform(&train.x)?;
            let x_test = scaler.transform(&test.x)?;

            let mut model = LogisticRegression::default();
            model.fit(&x_train, &train.y)?;
            let predictions = model.predict(&x_test)?;

            (Evaluation::from_predictions(&test.y, &predictions), None)
        }
        ModelVariant::Forest | ModelVariant::TunedForest => {
            let forest_config = if variant == ModelVariant::TunedForest {
                ForestConfig {
                    seed: config.seed,
                    ..ForestConfig::tuned()
                }
            } else {
                ForestConfig {
                    seed: config.seed,
                    ..ForestConfig::default()
                }
            };

            let mut model = RandomForest::new(forest_config);
            model.fit(&train.x, &train.y)?;
            let predictions = model.predict(&test.x)?;

            let ranking = model
                .feature_importance_ranking(&train.feature_names)
                .into_iter()
                .map(|(name, importance)| (name.to_string(), importance))
                .collect();

            (
                Evaluation::from_predictions(&test.y, &predictions),
                Some(ranking),
            )
        }
    };

    info!(
        variant = variant.key(),
        accuracy = evaluation.accuracy,
        "evaluated"
    );

    Ok(VariantOutcome {
        variant,
        evaluation,
        n_train: train.n_samples(),
        n_test: test.n_samples(),
        feature_importances,
    })
}

/// Run every variant in training order
pub fn run_all(rows: &[LabeledRow], config: &TrainerConfig) -> MlResult<Vec<VariantOutcome>> {
    ModelVariant::all()
        .iter()
        .map(|&variant| run_variant(rows, variant, config))
        .collect()
}
