//! Logistic regression for next-day direction
//!
//! Batch gradient descent with optional L2 regularization. Weights start
//! at zero, so fitting is deterministic with no RNG involved.

use super::error::{MlError, MlResult};
use ndarray::{Array1, Array2};
use tracing::{debug, warn};

/// Regularization applied to the weight gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Regularization {
    None,
    /// Ridge penalty with strength alpha
    L2(f64),
}

/// Logistic regression classifier
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Intercept term
    pub intercept: Option<f64>,
    learning_rate: f64,
    max_iter: usize,
    tolerance: f64,
    regularization: Regularization,
    /// Log-loss per iteration of the last fit
    pub cost_history: Vec<f64>,
}

impl Default for LogisticRegression {
    /// L2 with inverse strength C = 1.0
    fn default() -> Self {
        Self::with_l2(1.0)
    }
}

impl LogisticRegression {
    pub fn new(
        learning_rate: f64,
        max_iter: usize,
        tolerance: f64,
        regularization: Regularization,
    ) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            learning_rate,
            max_iter,
            tolerance,
            regularization,
            cost_history: Vec::new(),
        }
    }

    /// L2-regularized model; `c` is the inverse regularization strength
    pub fn with_l2(c: f64) -> Self {
        Self::new(0.01, 1000, 1e-6, Regularization::L2(1.0 / c))
    }

    /// Numerically stable sigmoid
    fn sigmoid(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let exp_z = z.exp();
            exp_z / (1.0 + exp_z)
        }
    }

    fn sigmoid_array(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(Self::sigmoid)
    }

    /// Binary cross-entropy
    fn log_loss(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        let eps = 1e-15;
        let n = y_true.len() as f64;

        -y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&y, &p)| {
                let p_clipped = p.clamp(eps, 1.0 - eps);
                y * p_clipped.ln() + (1.0 - y) * (1.0 - p_clipped).ln()
            })
            .sum::<f64>()
            / n
    }

    fn validate_fit_input(x: &Array2<f64>, y: &Array1<f64>) -> MlResult<()> {
        if x.nrows() == 0 {
            return Err(MlError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(MlError::LengthMismatch {
                n_rows: x.nrows(),
                n_labels: y.len(),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(MlError::NonFinite("feature matrix"));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(MlError::NonFinite("labels"));
        }
        let positives = y.iter().filter(|&&v| v > 0.5).count();
        if positives == 0 || positives == y.len() {
            return Err(MlError::SingleClass);
        }
        Ok(())
    }

    /// Fit by gradient descent. Either succeeds or returns an error;
    /// a degenerate input never yields a silently useless model.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> MlResult<()> {
        Self::validate_fit_input(x, y)?;

        let n_samples = x.nrows() as f64;
        let n_features = x.ncols();

        let mut weights = Array1::<f64>::zeros(n_features);
        let mut bias = 0.0;

        self.cost_history.clear();
        let mut converged = false;

        for iter in 0..self.max_iter {
            let linear = x.dot(&weights) + bias;
            let predictions = Self::sigmoid_array(&linear);

            let errors = &predictions - y;
            let mut dw = x.t().dot(&errors) / n_samples;
            let db = errors.sum() / n_samples;

            if let Regularization::L2(alpha) = self.regularization {
                dw = &dw + &(&weights * alpha);
            }

            weights = &weights - &(&dw * self.learning_rate);
            bias -= self.learning_rate * db;

            let cost = Self::log_loss(y, &predictions);
            self.cost_history.push(cost);

            if iter > 0 && (self.cost_history[iter - 1] - cost).abs() < self.tolerance {
                debug!(iteration = iter, cost, "gradient descent converged");
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                max_iter = self.max_iter,
                "gradient descent stopped before reaching tolerance"
            );
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);

        Ok(())
    }

    /// Probability of the positive class
    pub fn predict_proba(&self, x: &Array2<f64>) -> MlResult<Array1<f64>> {
        let weights = self.coefficients.as_ref().ok_or(MlError::NotFitted)?;
        let bias = self.intercept.ok_or(MlError::NotFitted)?;

        if x.ncols() != weights.len() {
            return Err(MlError::DimensionMismatch {
                expected: weights.len(),
                got: x.ncols(),
            });
        }

        let linear = x.dot(weights) + bias;
        Ok(Self::sigmoid_array(&linear))
    }

    /// Predicted labels (0.0 / 1.0) at the 0.5 threshold
    pub fn predict(&self, x: &Array2<f64>) -> MlResult<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    /// Human-readable coefficient table
    pub fn summary(&self, feature_names: &[String]) -> String {
        let mut s = String::new();

        if let Some(ref coef) = self.coefficients {
            s.push_str(&format!(
                "Intercept: {:.6}\n",
                self.intercept.unwrap_or(0.0)
            ));
            s.push_str("Coefficients (log-odds):\n");
            for (name, &c) in feature_names.iter().zip(coef.iter()) {
                s.push_str(&format!("  {:20}: {:>10.6} (OR: {:.4})\n", name, c, c.exp()));
            }
        } else {
            s.push_str("Model not fitted yet.\n");
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec(
            (6, 2),
            vec![0.0, 0.0, 0.5, 0.5, 1.0, 1.0, 5.0, 5.0, 5.5, 5.5, 6.0, 6.0],
        )
        .unwrap();
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        (x, y)
    }

    #[test]
    fn test_sigmoid() {
        assert!((LogisticRegression::sigmoid(0.0) - 0.5).abs() < 1e-10);
        assert!(LogisticRegression::sigmoid(100.0) > 0.99);
        assert!(LogisticRegression::sigmoid(-100.0) < 0.01);
    }

    #[test]
    fn test_fit_separable_data() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new(0.5, 1000, 1e-6, Regularization::None);
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(&p, &a)| (p - a).abs() < 0.5)
            .count();
        assert!(correct as f64 / y.len() as f64 >= 0.8);
    }

    #[test]
    fn test_cost_history_decreases() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();

        let first = model.cost_history[0];
        let last = *model.cost_history.last().unwrap();
        assert!(last < first);
    }

    #[test]
    fn test_l2_shrinks_coefficients() {
        let (x, y) = separable();

        let mut unregularized = LogisticRegression::new(0.5, 1000, 1e-9, Regularization::None);
        unregularized.fit(&x, &y).unwrap();
        let mut ridge = LogisticRegression::new(0.5, 1000, 1e-9, Regularization::L2(1.0));
        ridge.fit(&x, &y).unwrap();

        let norm = |m: &LogisticRegression| {
            m.coefficients
                .as_ref()
                .unwrap()
                .iter()
                .map(|c| c * c)
                .sum::<f64>()
                .sqrt()
        };
        assert!(norm(&ridge) < norm(&unregularized));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = separable();
        let mut a = LogisticRegression::default();
        let mut b = LogisticRegression::default();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.coefficients, b.coefficients);
        assert_eq!(a.intercept, b.intercept);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = LogisticRegression::default();
        let x = Array2::zeros((2, 2));
        assert!(matches!(model.predict(&x), Err(MlError::NotFitted)));
    }

    #[test]
    fn test_degenerate_fits_fail() {
        let mut model = LogisticRegression::default();

        let empty_x = Array2::zeros((0, 2));
        let empty_y = Array1::zeros(0);
        assert!(matches!(
            model.fit(&empty_x, &empty_y),
            Err(MlError::EmptyTrainingSet)
        ));

        let (x, _) = separable();
        let one_class = Array1::from_vec(vec![1.0; 6]);
        assert!(matches!(model.fit(&x, &one_class), Err(MlError::SingleClass)));

        let mut bad_x = x.clone();
        bad_x[[0, 0]] = f64::NAN;
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert!(matches!(
            model.fit(&bad_x, &y),
            Err(MlError::NonFinite("feature matrix"))
        ));
    }
}
