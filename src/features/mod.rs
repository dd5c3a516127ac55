//! Feature derivation and labeling

pub mod deriver;
pub mod labels;
pub mod rolling;

pub use deriver::{top_volatility, FeatureConfig, FeatureDeriver, FeatureRow, VolatilityRank};
pub use labels::{label_rows, Label, LabeledRow};
pub use rolling::RollingStats;
