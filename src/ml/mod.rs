//! Model training: datasets, class balancing, classifiers, and evaluation

pub mod dataset;
pub mod error;
pub mod forest;
pub mod logistic;
pub mod metrics;
pub mod smote;
pub mod trainer;
pub mod tree;

pub use dataset::{Dataset, FeatureSet, Split, Standardizer};
pub use error::{MlError, MlResult};
pub use forest::{ForestConfig, RandomForest};
pub use logistic::{LogisticRegression, Regularization};
pub use metrics::{ClassMetrics, ConfusionMatrix, Evaluation};
pub use smote::{Smote, SmoteConfig};
pub use trainer::{run_all, run_variant, ModelVariant, TrainerConfig, VariantOutcome};
pub use tree::{DecisionTree, TreeConfig};
