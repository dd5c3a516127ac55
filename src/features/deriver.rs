//! Derived feature columns over a daily bar series
//!
//! Extends each price bar with the columns the classifiers consume:
//! - daily return
//! - rolling volatility (sample stddev of trailing daily returns)
//! - lagged returns and a close/rolling-mean ratio for the tree models
//!
//! Derived values are NaN over warm-up prefixes; downstream stages drop
//! incomplete rows rather than imputing.

use super::rolling::RollingStats;
use crate::data::PriceBar;
use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::debug;

/// Windows for the derived columns
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    /// Trailing window for return volatility, in days
    pub volatility_window: usize,
    /// Window for the close / rolling-mean ratio
    pub sma_window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            volatility_window: 30,
            sma_window: 7,
        }
    }
}

/// One bar extended with derived columns. Undefined values are NaN.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    pub daily_return: f64,
    pub volatility: f64,
    pub return_lag_1: f64,
    pub return_lag_2: f64,
    pub close_sma_ratio: f64,
}

/// One entry of the top-volatility ranking
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityRank {
    pub date: NaiveDate,
    pub volatility: f64,
    pub close: f64,
}

/// Derives feature rows from a bar series
pub struct FeatureDeriver {
    config: FeatureConfig,
}

impl Default for FeatureDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureDeriver {
    pub fn new() -> Self {
        Self {
            config: FeatureConfig::default(),
        }
    }

    pub fn with_config(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Compute derived columns for every bar.
    ///
    /// Output has the same length as the input; the first row's return and
    /// the volatility warm-up prefix are NaN. The columns are pure
    /// functions of the bar series and recomputable at any time.
    pub fn derive(&self, bars: &[PriceBar]) -> Vec<FeatureRow> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let returns = RollingStats::returns(&closes);
        let volatility = RollingStats::std(&returns, self.config.volatility_window);
        let lag_1 = RollingStats::lag(&returns, 1);
        let lag_2 = RollingStats::lag(&returns, 2);
        let sma = RollingStats::mean(&closes, self.config.sma_window);

        let rows: Vec<FeatureRow> = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| FeatureRow {
                date: bar.date,
                close: bar.close,
                daily_return: returns[i],
                volatility: volatility[i],
                return_lag_1: lag_1[i],
                return_lag_2: lag_2[i],
                close_sma_ratio: if sma[i].is_finite() && sma[i] != 0.0 {
                    closes[i] / sma[i]
                } else {
                    f64::NAN
                },
            })
            .collect();

        debug!(
            n_rows = rows.len(),
            volatility_window = self.config.volatility_window,
            "derived feature rows"
        );
        rows
    }
}

/// Rank rows by volatility, highest first, and return the top `k`.
///
/// Rows with undefined volatility are excluded. Ties are broken by the
/// earlier date, so the ranking is a total order and repeated calls give
/// identical output.
pub fn top_volatility(rows: &[FeatureRow], k: usize) -> Vec<VolatilityRank> {
    let mut ranked: Vec<VolatilityRank> = rows
        .iter()
        .filter(|r| r.volatility.is_finite())
        .map(|r| VolatilityRank {
            date: r.date,
            volatility: r.volatility,
            close: r.close,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.volatility
            .partial_cmp(&a.volatility)
            .unwrap_or(Ordering::Equal)
            .then(a.date.cmp(&b.date))
    });
    ranked.truncate(k);
    ranked
}
