//! API error types

use crate::data::DataError;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur when fetching market data
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Provider returned error: {code} - {message}")]
    ProviderError { code: String, message: String },

    #[error("Response missing {0}")]
    MissingField(&'static str),

    #[error("Invalid unix timestamp in response: {0}")]
    InvalidTimestamp(i64),

    #[error("Incomplete OHLCV row at {date}")]
    IncompleteRow { date: NaiveDate },

    #[error("Invalid date range: {start}..{end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Fetched series failed validation: {0}")]
    InvalidSeries(#[from] DataError),

    #[error("No data available")]
    NoData,
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
