//! Classification report files
//!
//! Renders per-variant text reports in a fixed positional layout: a
//! header row, a blank line, one row per class, a blank line, then
//! accuracy / macro avg / weighted avg rows. Downstream consumers parse
//! these files by line position and token count, so the layout is a
//! compatibility contract; [`parse_report`] reads it back the same way
//! and pins the format in tests.

use crate::features::Label;
use crate::ml::{ClassMetrics, Evaluation};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

const HEADERS: [&str; 4] = ["precision", "recall", "f1-score", "support"];

/// Render an evaluation in the classification-report layout.
///
/// Class rows appear in label order (0 then 1). Metric columns are 9
/// characters wide with two decimals; the name column is as wide as the
/// longest row name.
pub fn classification_report(eval: &Evaluation) -> String {
    let names = [Label::DidNotIncrease.name(), Label::Increased.name()];
    let width = names
        .iter()
        .map(|n| n.len())
        .chain(std::iter::once("weighted avg".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!("{:>width$} ", "");
    for header in HEADERS {
        out.push_str(&format!(" {header:>9}"));
    }
    out.push('\n');
    out.push('\n');

    for (name, metrics) in names.iter().zip([&eval.negative, &eval.positive]) {
        out.push_str(&metric_row(name, metrics, width));
    }
    out.push('\n');

    // the accuracy row leaves the precision and recall columns blank
    out.push_str(&format!(
        "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy", "", "", eval.accuracy, eval.macro_avg.support,
    ));
    out.push_str(&metric_row("macro avg", &eval.macro_avg, width));
    out.push_str(&metric_row("weighted avg", &eval.weighted_avg, width));

    out
}

fn metric_row(name: &str, metrics: &ClassMetrics, width: usize) -> String {
    format!(
        "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
        name, metrics.precision, metrics.recall, metrics.f1, metrics.support,
    )
}

/// Write the report for one evaluation to `path`
pub fn write_report<P: AsRef<Path>>(eval: &Evaluation, path: P) -> Result<()> {
    fs::write(&path, classification_report(eval))
        .with_context(|| format!("Failed to write report: {:?}", path.as_ref()))
}

/// One parsed class row
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// The parts of a report consumers read back: class rows and accuracy
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub rows: Vec<ParsedRow>,
    pub accuracy: f64,
}

/// Parse a report positionally: the class rows are lines 2 and 3, with
/// the last four tokens numeric and everything before them the class
/// name; accuracy is the second-to-last token of the row naming it.
pub fn parse_report(text: &str) -> Result<ParsedReport> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 4 {
        bail!("report too short: {} lines", lines.len());
    }

    let mut rows = Vec::new();
    for line in &lines[2..4] {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 5 {
            bail!("malformed class row: {line:?}");
        }
        let (name_tokens, values) = tokens.split_at(tokens.len() - 4);
        rows.push(ParsedRow {
            class: name_tokens.join(" "),
            precision: values[0].parse()?,
            recall: values[1].parse()?,
            f1: values[2].parse()?,
            support: values[3].parse()?,
        });
    }

    let accuracy = lines
        .iter()
        .find(|line| line.to_lowercase().contains("accuracy"))
        .and_then(|line| line.split_whitespace().rev().nth(1))
        .context("no accuracy row")?
        .parse()?;

    Ok(ParsedReport { rows, accuracy })
}
