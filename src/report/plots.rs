//! PNG chart artifacts
//!
//! Closing price and volatility time series, the daily-return histogram,
//! and one confusion-matrix heatmap per trained model variant. All
//! charts render to fixed-size bitmaps; callers choose the output paths.

use crate::data::PriceBar;
use crate::features::{FeatureRow, Label};
use crate::ml::ConfusionMatrix;
use anyhow::{ensure, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1280, 720);
const MATRIX_SIZE: (u32, u32) = (760, 680);
const HISTOGRAM_BINS: usize = 80;

/// Plot the closing price series over time.
pub fn plot_close_series<P: AsRef<Path>>(bars: &[PriceBar], title: &str, path: P) -> Result<()> {
    ensure!(!bars.is_empty(), "no bars to plot");

    let root = BitMapBackend::new(path.as_ref(), CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (min_close, max_close) = value_bounds(bars.iter().map(|b| b.close));
    let pad = (max_close - min_close).max(1.0) * 0.05;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(
            bars[0].date..bars[bars.len() - 1].date,
            (min_close - pad)..(max_close + pad),
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(8)
        .x_label_formatter(&|d| d.format("%Y-%m").to_string())
        .y_desc("Close (USD)")
        .draw()?;

    chart.draw_series(LineSeries::new(
        bars.iter().map(|b| (b.date, b.close)),
        &BLUE,
    ))?;

    root.present()?;
    Ok(())
}

/// Plot the rolling volatility series. Rows where the window is not yet
/// full carry NaN and are skipped.
pub fn plot_volatility_series<P: AsRef<Path>>(
    rows: &[FeatureRow],
    title: &str,
    path: P,
) -> Result<()> {
    let points: Vec<_> = rows
        .iter()
        .filter(|r| r.volatility.is_finite())
        .map(|r| (r.date, r.volatility))
        .collect();
    ensure!(!points.is_empty(), "no defined volatility values to plot");

    let root = BitMapBackend::new(path.as_ref(), CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (min_vol, max_vol) = value_bounds(points.iter().map(|&(_, v)| v));
    let pad = (max_vol - min_vol).max(1e-6) * 0.05;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(
            points[0].0..points[points.len() - 1].0,
            (min_vol - pad).max(0.0)..(max_vol + pad),
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(8)
        .x_label_formatter(&|d| d.format("%Y-%m").to_string())
        .y_desc("Rolling std of daily returns")
        .draw()?;

    chart.draw_series(LineSeries::new(points, &RED))?;

    root.present()?;
    Ok(())
}

/// Plot the distribution of daily returns as a histogram.
pub fn plot_return_histogram<P: AsRef<Path>>(
    rows: &[FeatureRow],
    title: &str,
    path: P,
) -> Result<()> {
    let returns: Vec<f64> = rows
        .iter()
        .map(|r| r.daily_return)
        .filter(|v| v.is_finite())
        .collect();
    ensure!(!returns.is_empty(), "no defined returns to plot");

    let (min_ret, max_ret) = value_bounds(returns.iter().copied());
    let span = (max_ret - min_ret).max(1e-12);
    let bin_width = span / HISTOGRAM_BINS as f64;

    let mut counts = vec![0usize; HISTOGRAM_BINS];
    for r in &returns {
        let idx = (((r - min_ret) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        counts[idx] += 1;
    }
    let y_max = counts.iter().max().copied().unwrap_or(1) as f64 * 1.05;

    let root = BitMapBackend::new(path.as_ref(), CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(min_ret..max_ret, 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Daily return")
        .y_desc("Days")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
        let x0 = min_ret + i as f64 * bin_width;
        Rectangle::new(
            [(x0, 0.0), (x0 + bin_width, count as f64)],
            BLUE.mix(0.5).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Plot a 2x2 confusion-matrix heatmap. Rows are actual classes, columns
/// predicted; cell shade scales with count.
pub fn plot_confusion_matrix<P: AsRef<Path>>(
    matrix: &ConfusionMatrix,
    title: &str,
    path: P,
) -> Result<()> {
    let root = BitMapBackend::new(path.as_ref(), MATRIX_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let names = [Label::DidNotIncrease.name(), Label::Increased.name()];
    let max_count = (0..2)
        .flat_map(|a| (0..2).map(move |p| matrix.count(a, p)))
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    // grid geometry in backend pixels
    let cell: i32 = 230;
    let left: i32 = 200;
    let top: i32 = 100;

    let title_style = TextStyle::from(("sans-serif", 28).into_font())
        .pos(Pos::new(HPos::Center, VPos::Top));
    let label_style = TextStyle::from(("sans-serif", 18).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    let count_style = TextStyle::from(("sans-serif", 26).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));

    root.draw(&Text::new(
        title.to_string(),
        (MATRIX_SIZE.0 as i32 / 2, 25),
        title_style,
    ))?;

    for actual in 0..2usize {
        for predicted in 0..2usize {
            let count = matrix.count(actual, predicted);
            let x0 = left + predicted as i32 * cell;
            let y0 = top + actual as i32 * cell;

            // keep the darkest cell light enough for black count text
            let shade = 0.10 + 0.55 * (count as f64 / max_count);
            root.draw(&Rectangle::new(
                [(x0, y0), (x0 + cell, y0 + cell)],
                BLUE.mix(shade).filled(),
            ))?;
            root.draw(&Rectangle::new(
                [(x0, y0), (x0 + cell, y0 + cell)],
                BLACK.stroke_width(1),
            ))?;
            root.draw(&Text::new(
                count.to_string(),
                (x0 + cell / 2, y0 + cell / 2),
                count_style.clone(),
            ))?;
        }
    }

    // column labels below the grid, row labels beside it
    for (idx, name) in names.iter().enumerate() {
        let center = left + idx as i32 * cell + cell / 2;
        root.draw(&Text::new(
            name.to_string(),
            (center, top + 2 * cell + 20),
            label_style.clone(),
        ))?;
        root.draw(&Text::new(
            name.to_string(),
            (left / 2, top + idx as i32 * cell + cell / 2),
            label_style.clone(),
        ))?;
    }
    root.draw(&Text::new(
        "Predicted".to_string(),
        (left + cell, top + 2 * cell + 55),
        label_style.clone(),
    ))?;
    root.draw(&Text::new(
        "Actual".to_string(),
        (left / 2, top - 30),
        label_style,
    ))?;

    root.present()?;
    Ok(())
}

fn value_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}
