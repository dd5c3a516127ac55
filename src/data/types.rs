//! Core market data types
//!
//! This module defines the daily price bar used throughout the pipeline and
//! the validation every series passes through when it enters the system.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a price series fails load-time validation.
///
/// Malformed input is never repaired; a series either validates or the
/// load fails.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("empty price series")]
    EmptySeries,

    #[error("non-finite {field} value at {date}")]
    NonFinite { date: NaiveDate, field: &'static str },

    #[error("negative {field} value at {date}")]
    Negative { date: NaiveDate, field: &'static str },

    #[error("dates not strictly increasing: {previous} followed by {current}")]
    OutOfOrder {
        previous: NaiveDate,
        current: NaiveDate,
    },
}

/// One daily OHLCV bar.
///
/// Dates are calendar days; gaps in the series (days the provider has no
/// data for) are simply absent rows, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Named numeric fields, in column order. Used by validation.
    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
    }
}

/// Validate a bar series: non-empty, strictly increasing unique dates,
/// all numeric fields finite and non-negative.
pub fn validate_bars(bars: &[PriceBar]) -> Result<(), DataError> {
    if bars.is_empty() {
        return Err(DataError::EmptySeries);
    }

    for bar in bars {
        for (field, value) in bar.fields() {
            if !value.is_finite() {
                return Err(DataError::NonFinite {
                    date: bar.date,
                    field,
                });
            }
            if value < 0.0 {
                return Err(DataError::Negative {
                    date: bar.date,
                    field,
                });
            }
        }
    }

    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(DataError::OutOfOrder {
                previous: pair[0].date,
                current: pair[1].date,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> PriceBar {
        PriceBar {
            date: date.parse().unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_valid_series_passes() {
        let bars = vec![bar("2020-01-01", 100.0), bar("2020-01-02", 101.0)];
        assert!(validate_bars(&bars).is_ok());
    }

    #[test]
    fn test_empty_series_rejected() {
        assert!(matches!(validate_bars(&[]), Err(DataError::EmptySeries)));
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let bars = vec![bar("2020-01-01", 100.0), bar("2020-01-01", 101.0)];
        assert!(matches!(
            validate_bars(&bars),
            Err(DataError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn test_out_of_order_dates_rejected() {
        let bars = vec![bar("2020-01-02", 100.0), bar("2020-01-01", 101.0)];
        assert!(matches!(
            validate_bars(&bars),
            Err(DataError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn test_nan_value_rejected() {
        let mut bars = vec![bar("2020-01-01", 100.0)];
        bars[0].volume = f64::NAN;
        assert!(matches!(
            validate_bars(&bars),
            Err(DataError::NonFinite { field: "volume", .. })
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let bars = vec![bar("2020-01-01", -1.0)];
        assert!(matches!(
            validate_bars(&bars),
            Err(DataError::Negative { field: "open", .. })
        ));
    }
}
