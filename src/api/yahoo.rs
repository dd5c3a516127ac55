//! Yahoo Finance chart API client
//!
//! Fetches daily OHLCV history for a symbol over a date range.
//!
//! # Example
//!
//! ```rust,no_run
//! use crypto_trend::api::YahooClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = YahooClient::new();
//!     let start = "2017-01-01".parse().unwrap();
//!     let end = "2025-03-01".parse().unwrap();
//!     let bars = client.fetch_daily("BTC-USD", start, end).await.unwrap();
//!     println!("Got {} bars", bars.len());
//! }
//! ```

use super::error::{ApiError, ApiResult};
use crate::data::types::{validate_bars, PriceBar};
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

/// Yahoo Finance v8 chart API base URL
const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Client for the Yahoo Finance chart API
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

/// Top-level chart response
#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

/// Parallel OHLCV arrays; entries are null on days the provider has no data
#[derive(Debug, Deserialize)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooClient {
    /// Create a new client against the public endpoint
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Create a client with a custom base URL (for tests against a local server)
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch daily bars for `symbol` over `[start, end]`.
    ///
    /// Both bounds are inclusive. The returned series is validated
    /// (strictly increasing dates, finite non-negative values) before
    /// being handed to the caller.
    pub async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<Vec<PriceBar>> {
        if start > end {
            return Err(ApiError::InvalidRange { start, end });
        }
        let after_end = end
            .succ_opt()
            .ok_or(ApiError::InvalidRange { start, end })?;

        let url = format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            symbol,
            midnight_utc(start),
            midnight_utc(after_end),
        );
        debug!(%symbol, %start, %end, "requesting daily bars");

        let body = self
            .client
            .get(&url)
            .header("User-Agent", "Mozilla/5.0")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: YahooResponse = serde_json::from_str(&body)?;
        let bars = bars_from_response(response)?;
        validate_bars(&bars)?;

        info!(%symbol, n_bars = bars.len(), "fetched daily series");
        Ok(bars)
    }
}

/// Unix seconds at midnight UTC for a calendar date
fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

/// Convert a chart response into price bars.
///
/// A row where every OHLCV entry is null is a provider placeholder for an
/// absent day and is skipped. A row where only some entries are null is a
/// data-quality failure and aborts the fetch.
fn bars_from_response(response: YahooResponse) -> ApiResult<Vec<PriceBar>> {
    if let Some(error) = response.chart.error {
        return Err(ApiError::ProviderError {
            code: error.code,
            message: error.description,
        });
    }

    let data = response
        .chart
        .result
        .ok_or(ApiError::MissingField("chart.result"))?
        .into_iter()
        .next()
        .ok_or(ApiError::NoData)?;

    let timestamps = data.timestamp.ok_or(ApiError::MissingField("timestamp"))?;
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or(ApiError::MissingField("indicators.quote"))?;

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = DateTime::from_timestamp(ts, 0)
            .ok_or(ApiError::InvalidTimestamp(ts))?
            .date_naive();

        let row = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        );

        match row {
            (Some(open), Some(high), Some(low), Some(close), Some(volume)) => {
                bars.push(PriceBar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume: volume as f64,
                });
            }
            (None, None, None, None, None) => continue,
            _ => return Err(ApiError::IncompleteRow { date }),
        }
    }

    if bars.is_empty() {
        return Err(ApiError::NoData);
    }

    Ok(bars)
}
