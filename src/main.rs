//! Crypto Trend - Bitcoin direction classification
//!
//! Command-line entry point for the pipeline: fetch daily BTC-USD bars,
//! summarize the series with chart artifacts, and train the direction
//! classifiers with classification reports and confusion matrices.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use crypto_trend::api::YahooClient;
use crypto_trend::data::PriceLoader;
use crypto_trend::features::{label_rows, top_volatility, FeatureDeriver};
use crypto_trend::ml::{run_all, run_variant, ModelVariant, TrainerConfig, VariantOutcome};
use crypto_trend::report;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crypto_trend")]
#[command(about = "Bitcoin direction classification from daily OHLCV data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch daily OHLCV bars from Yahoo Finance
    Fetch {
        /// Ticker symbol
        #[arg(short, long, default_value = "BTC-USD")]
        symbol: String,

        /// First day of the range (inclusive)
        #[arg(long, default_value = "2017-01-01")]
        start: NaiveDate,

        /// Last day of the range (inclusive)
        #[arg(long, default_value = "2025-03-01")]
        end: NaiveDate,

        /// Output CSV path
        #[arg(short, long, default_value = "data/btc_usd_daily.csv")]
        output: PathBuf,
    },

    /// Summarize the series and write price, volatility, and return charts
    Analyze {
        /// Path to the bar CSV
        #[arg(short, long, default_value = "data/btc_usd_daily.csv")]
        data: PathBuf,

        /// Number of most-volatile days to list
        #[arg(short, long, default_value = "5")]
        top: usize,

        /// Directory for chart PNGs
        #[arg(long, default_value = "images")]
        images_dir: PathBuf,
    },

    /// Train direction classifiers and write evaluation artifacts
    Train {
        /// Path to the bar CSV
        #[arg(short, long, default_value = "data/btc_usd_daily.csv")]
        data: PathBuf,

        /// Variant key (initial, balanced, rf, rf_improved_v2) or "all"
        #[arg(short, long, default_value = "all")]
        model: String,

        /// Fraction of rows held out for testing
        #[arg(long, default_value = "0.2")]
        test_ratio: f64,

        /// Seed for the split, SMOTE, and forest building
        #[arg(long, default_value = "69")]
        seed: u64,

        /// Hold out the latest rows instead of a seeded random sample
        #[arg(long)]
        chronological: bool,

        /// Directory for classification report text files
        #[arg(long, default_value = "reports")]
        reports_dir: PathBuf,

        /// Directory for confusion-matrix PNGs
        #[arg(long, default_value = "images")]
        images_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crypto_trend=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            symbol,
            start,
            end,
            output,
        } => fetch(&symbol, start, end, &output).await,

        Commands::Analyze {
            data,
            top,
            images_dir,
        } => analyze(&data, top, &images_dir),

        Commands::Train {
            data,
            model,
            test_ratio,
            seed,
            chronological,
            reports_dir,
            images_dir,
        } => {
            let config = TrainerConfig {
                test_ratio,
                seed,
                chronological,
            };
            train(&data, &model, &config, &reports_dir, &images_dir)
        }
    }
}

async fn fetch(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    output: &PathBuf,
) -> anyhow::Result<()> {
    info!("Fetching {} daily bars for {}..{}", symbol, start, end);

    let client = YahooClient::new();
    let bars = client.fetch_daily(symbol, start, end).await?;
    info!("Fetched {} bars", bars.len());

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    PriceLoader::save_bars(&bars, output)?;
    info!("Saved to {:?}", output);

    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!("\n{} Daily Data Summary", symbol);
        println!("==========================");
        println!("First day:  {}", first.date);
        println!("Last day:   {}", last.date);
        println!("Total days: {}", bars.len());
        println!(
            "Close range: {:.2} - {:.2}",
            bars.iter().map(|b| b.close).fold(f64::INFINITY, f64::min),
            bars.iter().map(|b| b.close).fold(f64::NEG_INFINITY, f64::max)
        );
    }

    Ok(())
}

fn analyze(data: &PathBuf, top: usize, images_dir: &PathBuf) -> anyhow::Result<()> {
    let bars = PriceLoader::load_bars(data)?;
    info!("Loaded {} bars from {:?}", bars.len(), data);

    let rows = FeatureDeriver::new().derive(&bars);
    let returns: Vec<f64> = rows
        .iter()
        .map(|r| r.daily_return)
        .filter(|v| v.is_finite())
        .collect();
    let defined_vol = rows.iter().filter(|r| r.volatility.is_finite()).count();

    println!("\nSeries Summary");
    println!("==============");
    println!("Rows:               {}", rows.len());
    println!("Defined returns:    {}", returns.len());
    println!("Defined volatility: {}", defined_vol);
    if returns.len() >= 2 {
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
            / (returns.len() - 1) as f64;
        println!("Mean daily return:  {:.5}", mean);
        println!("Std daily return:   {:.5}", var.sqrt());
    }

    println!("\nTop {} Most Volatile Days", top);
    println!("=========================");
    println!("{:<12} {:>12} {:>12}", "Date", "Volatility", "Close");
    println!("{}", "-".repeat(38));
    for rank in top_volatility(&rows, top) {
        println!(
            "{:<12} {:>12.4} {:>12.2}",
            rank.date.to_string(),
            rank.volatility,
            rank.close
        );
    }

    fs::create_dir_all(images_dir)?;
    report::plot_close_series(
        &bars,
        "BTC-USD Closing Price Over Time",
        images_dir.join("btc_closing_price_over_time.png"),
    )?;
    report::plot_volatility_series(
        &rows,
        "BTC-USD 30-Day Rolling Volatility",
        images_dir.join("btc_volatility_30d.png"),
    )?;
    report::plot_return_histogram(
        &rows,
        "BTC-USD Daily Return Distribution",
        images_dir.join("btc_daily_return_distribution.png"),
    )?;
    info!("Charts written to {:?}", images_dir);

    Ok(())
}

fn train(
    data: &PathBuf,
    model: &str,
    config: &TrainerConfig,
    reports_dir: &PathBuf,
    images_dir: &PathBuf,
) -> anyhow::Result<()> {
    let bars = PriceLoader::load_bars(data)?;
    let rows = FeatureDeriver::new().derive(&bars);
    let labeled = label_rows(&rows);
    info!("Derived {} labeled rows from {} bars", labeled.len(), bars.len());

    let outcomes = if model == "all" {
        run_all(&labeled, config)?
    } else {
        let variant = ModelVariant::from_key(model).with_context(|| {
            format!(
                "unknown model {model:?} (expected initial, balanced, rf, rf_improved_v2, or all)"
            )
        })?;
        vec![run_variant(&labeled, variant, config)?]
    };

    fs::create_dir_all(reports_dir)?;
    fs::create_dir_all(images_dir)?;

    for outcome in &outcomes {
        print_outcome(outcome);

        let report_path = reports_dir.join(format!(
            "classification_report_{}.txt",
            outcome.variant.key()
        ));
        report::write_report(&outcome.evaluation, &report_path)?;

        let matrix_path =
            images_dir.join(format!("confusion_matrix_{}.png", outcome.variant.key()));
        report::plot_confusion_matrix(
            &outcome.evaluation.confusion,
            &format!("Confusion Matrix - {}", outcome.variant.title()),
            &matrix_path,
        )?;

        info!("Wrote {:?} and {:?}", report_path, matrix_path);
    }

    Ok(())
}

fn print_outcome(outcome: &VariantOutcome) {
    println!("\n=== {} ===", outcome.variant.title());
    println!("Train: {} rows, Test: {} rows\n", outcome.n_train, outcome.n_test);
    print!("{}", report::classification_report(&outcome.evaluation));

    if let Some(importances) = &outcome.feature_importances {
        println!("\nFeature Importance Ranking");
        println!("{}", "-".repeat(40));
        for (i, (name, imp)) in importances.iter().enumerate() {
            let bar = "█".repeat((imp * 40.0) as usize);
            println!("{:2}. {:18} {:.4} {}", i + 1, name, imp, bar);
        }
    }
}
