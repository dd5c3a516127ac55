//! Report artifacts: classification report text files and PNG charts.

pub mod plots;
pub mod text;

pub use plots::{
    plot_close_series, plot_confusion_matrix, plot_return_histogram, plot_volatility_series,
};
pub use text::{classification_report, parse_report, write_report, ParsedReport, ParsedRow};
