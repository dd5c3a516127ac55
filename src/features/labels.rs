//! Next-day direction labels
//!
//! A row is labeled by whether the following day's close is strictly
//! higher. The final row has no following day and is dropped, so the
//! labeled series is always one shorter than its input.

use super::deriver::FeatureRow;

/// Binary next-day direction target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    DidNotIncrease,
    Increased,
}

impl Label {
    /// Numeric encoding used by the models (0.0 / 1.0)
    pub fn as_f64(self) -> f64 {
        match self {
            Label::DidNotIncrease => 0.0,
            Label::Increased => 1.0,
        }
    }

    /// Display name used in classification reports
    pub fn name(self) -> &'static str {
        match self {
            Label::DidNotIncrease => "Did Not Increase",
            Label::Increased => "Increased",
        }
    }

    /// Decode the numeric encoding; anything above 0.5 is `Increased`
    pub fn from_f64(value: f64) -> Self {
        if value > 0.5 {
            Label::Increased
        } else {
            Label::DidNotIncrease
        }
    }
}

/// A feature row paired with its next-day direction label
#[derive(Debug, Clone)]
pub struct LabeledRow {
    pub row: FeatureRow,
    pub label: Label,
}

/// Attach next-day labels.
///
/// `label[t] = Increased` iff `close[t+1] > close[t]`; an unchanged close
/// counts as `DidNotIncrease`. Output preserves date order and omits the
/// final input row. Series with fewer than two rows produce no labels.
pub fn label_rows(rows: &[FeatureRow]) -> Vec<LabeledRow> {
    rows.windows(2)
        .map(|pair| LabeledRow {
            row: pair[0].clone(),
            label: if pair[1].close > pair[0].close {
                Label::Increased
            } else {
                Label::DidNotIncrease
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceBar;
    use crate::features::deriver::FeatureDeriver;

    fn rows_from_closes(closes: &[f64]) -> Vec<FeatureRow> {
        let start: chrono::NaiveDate = "2020-01-01".parse().unwrap();
        let bars: Vec<PriceBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + chrono::Days::new(i as u64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            })
            .collect();
        FeatureDeriver::new().derive(&bars)
    }

    #[test]
    fn test_labels_follow_next_close() {
        let rows = rows_from_closes(&[100.0, 110.0, 110.0, 90.0]);
        let labeled = label_rows(&rows);

        assert_eq!(labeled.len(), 3);
        assert_eq!(labeled[0].label, Label::Increased);
        // unchanged close is not an increase
        assert_eq!(labeled[1].label, Label::DidNotIncrease);
        assert_eq!(labeled[2].label, Label::DidNotIncrease);
    }

    #[test]
    fn test_final_row_dropped_and_order_kept() {
        let rows = rows_from_closes(&[1.0, 2.0, 3.0]);
        let labeled = label_rows(&rows);

        assert_eq!(labeled.len(), 2);
        assert_eq!(labeled[0].row.date, rows[0].date);
        assert_eq!(labeled[1].row.date, rows[1].date);
    }

    #[test]
    fn test_short_series_produce_no_labels() {
        assert!(label_rows(&[]).is_empty());
        assert!(label_rows(&rows_from_closes(&[100.0])).is_empty());
    }

    #[test]
    fn test_label_encoding_round_trip() {
        assert_eq!(Label::from_f64(Label::Increased.as_f64()), Label::Increased);
        assert_eq!(
            Label::from_f64(Label::DidNotIncrease.as_f64()),
            Label::DidNotIncrease
        );
    }
}
