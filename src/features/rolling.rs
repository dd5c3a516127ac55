//! Rolling-window statistics over price series
//!
//! All functions return a vector the same length as the input, with NaN
//! over the warm-up prefix. A window that contains any non-finite value
//! yields NaN rather than a partial estimate, so undefined values
//! propagate through derived columns instead of being imputed.

/// Rolling-window statistics calculator
pub struct RollingStats;

impl RollingStats {
    /// Simple returns: `(p[t] - p[t-1]) / p[t-1]`, NaN for the first element
    pub fn returns(prices: &[f64]) -> Vec<f64> {
        if prices.is_empty() {
            return vec![];
        }

        let mut result = vec![f64::NAN];

        for i in 1..prices.len() {
            if prices[i - 1] != 0.0 {
                result.push((prices[i] - prices[i - 1]) / prices[i - 1]);
            } else {
                result.push(f64::NAN);
            }
        }

        result
    }

    /// Rolling sample standard deviation (ddof = 1) over trailing windows
    /// of `period` values inclusive of the current element.
    pub fn std(values: &[f64], period: usize) -> Vec<f64> {
        if period < 2 || values.len() < period {
            return vec![f64::NAN; values.len()];
        }

        let mut result = vec![f64::NAN; period - 1];

        for i in (period - 1)..values.len() {
            let window = &values[(i + 1 - period)..=i];
            if window.iter().any(|v| !v.is_finite()) {
                result.push(f64::NAN);
                continue;
            }

            let mean: f64 = window.iter().sum::<f64>() / period as f64;
            let variance: f64 = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>()
                / (period - 1) as f64;
            result.push(variance.sqrt());
        }

        result
    }

    /// Rolling mean over trailing windows of `period` values
    pub fn mean(values: &[f64], period: usize) -> Vec<f64> {
        if period == 0 || values.len() < period {
            return vec![f64::NAN; values.len()];
        }

        let mut result = vec![f64::NAN; period - 1];

        for i in (period - 1)..values.len() {
            let window = &values[(i + 1 - period)..=i];
            if window.iter().any(|v| !v.is_finite()) {
                result.push(f64::NAN);
                continue;
            }

            result.push(window.iter().sum::<f64>() / period as f64);
        }

        result
    }

    /// Shift a series back by `k` steps, NaN over the first `k` elements
    pub fn lag(values: &[f64], k: usize) -> Vec<f64> {
        if k >= values.len() {
            return vec![f64::NAN; values.len()];
        }

        let mut result = vec![f64::NAN; k];
        result.extend_from_slice(&values[..values.len() - k]);
        result
    }
}
