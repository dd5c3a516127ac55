//! Classification metrics
//!
//! Confusion matrix and the per-class precision/recall/F1/support rows
//! a classification report is built from, plus accuracy and the macro
//! and support-weighted averages over both classes.

use ndarray::Array1;

/// Binary confusion matrix. Labels above 0.5 count as positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut cm = Self {
            tn: 0,
            fp: 0,
            fn_: 0,
            tp: 0,
        };

        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t > 0.5, p > 0.5) {
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
                (true, true) => cm.tp += 1,
            }
        }

        cm
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    /// Count of rows with the given actual and predicted classes
    pub fn count(&self, actual: usize, predicted: usize) -> usize {
        match (actual, predicted) {
            (0, 0) => self.tn,
            (0, 1) => self.fp,
            (1, 0) => self.fn_,
            _ => self.tp,
        }
    }

    /// Formatted matrix for logs
    pub fn display(&self) -> String {
        format!(
            "Predicted:      0       1\n\
             Actual 0:   {:>5}   {:>5}\n\
             Actual 1:   {:>5}   {:>5}\n",
            self.tn, self.fp, self.fn_, self.tp
        )
    }
}

/// Precision, recall, F1, and support for one class (or an average row)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassMetrics {
    /// Metrics from one-vs-rest counts. Empty denominators score zero
    /// rather than NaN, so a model that never predicts a class still
    /// produces a readable report.
    fn from_counts(tp: usize, fp: usize, fn_: usize) -> Self {
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            precision,
            recall,
            f1,
            support: tp + fn_,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Full evaluation of binary predictions against true labels
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    /// Metrics for label 0
    pub negative: ClassMetrics,
    /// Metrics for label 1
    pub positive: ClassMetrics,
    pub accuracy: f64,
    /// Unweighted mean over the two classes; support is the total count
    pub macro_avg: ClassMetrics,
    /// Support-weighted mean over the two classes
    pub weighted_avg: ClassMetrics,
}

impl Evaluation {
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let cm = ConfusionMatrix::from_predictions(y_true, y_pred);

        // label 0 is the positive class of its own one-vs-rest problem
        let negative = ClassMetrics::from_counts(cm.tn, cm.fn_, cm.fp);
        let positive = ClassMetrics::from_counts(cm.tp, cm.fp, cm.fn_);

        let total = cm.total();
        let accuracy = ratio(cm.tp + cm.tn, total);

        let macro_avg = ClassMetrics {
            precision: (negative.precision + positive.precision) / 2.0,
            recall: (negative.recall + positive.recall) / 2.0,
            f1: (negative.f1 + positive.f1) / 2.0,
            support: total,
        };

        let weighted = |neg: f64, pos: f64| {
            if total == 0 {
                0.0
            } else {
                (neg * negative.support as f64 + pos * positive.support as f64) / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(negative.precision, positive.precision),
            recall: weighted(negative.recall, positive.recall),
            f1: weighted(negative.f1, positive.f1),
            support: total,
        };

        Self {
            confusion: cm,
            negative,
            positive,
            accuracy,
            macro_avg,
            weighted_avg,
        }
    }
}
