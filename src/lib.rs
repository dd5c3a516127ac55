//! # Crypto Trend - Bitcoin Direction Classification
//!
//! This library implements a daily BTC-USD trend-classification pipeline:
//!
//! - Daily OHLCV download from the Yahoo Finance chart API
//! - Feature derivation: daily returns, 30-day rolling volatility,
//!   lagged returns, and a close/SMA ratio
//! - Next-day direction labels (did the close increase tomorrow?)
//! - SMOTE balancing of the training split
//! - Logistic regression and random forest classifiers
//! - Classification reports, confusion matrices, and chart artifacts

pub mod api;
pub mod data;
pub mod features;
pub mod ml;
pub mod report;

pub use api::yahoo::YahooClient;
pub use data::loader::PriceLoader;
pub use data::types::PriceBar;
pub use features::deriver::{FeatureDeriver, FeatureRow};
pub use features::labels::{label_rows, Label, LabeledRow};
pub use ml::trainer::{run_all, run_variant, ModelVariant, TrainerConfig};
