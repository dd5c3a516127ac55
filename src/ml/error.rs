//! Model training error types

use thiserror::Error;

/// Errors raised by dataset handling, balancing, and model fitting.
///
/// A degenerate fit input aborts the run; training never limps along on
/// an empty or single-class set.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("empty training set")]
    EmptyTrainingSet,

    #[error("training set contains a single class")]
    SingleClass,

    #[error("minority class has {n_minority} samples, need at least 2 to oversample")]
    MinorityTooSmall { n_minority: usize },

    #[error("dimension mismatch: expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("feature/label length mismatch: {n_rows} rows, {n_labels} labels")]
    LengthMismatch { n_rows: usize, n_labels: usize },

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("model used before fit")]
    NotFitted,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for ML operations
pub type MlResult<T> = Result<T, MlError>;
