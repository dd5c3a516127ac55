//! Price series loading and saving
//!
//! CSV and JSON persistence for daily bar series. Every load runs the
//! series through [`validate_bars`](super::types::validate_bars), so
//! malformed files fail here rather than deep inside the pipeline.

use super::types::{validate_bars, PriceBar};
use anyhow::{Context, Result};
use csv::{Reader, Writer};
use std::fs::File;
use std::path::Path;

/// Loader for daily price series files
pub struct PriceLoader;

impl PriceLoader {
    /// Load and validate bars from a CSV file
    pub fn load_bars<P: AsRef<Path>>(path: P) -> Result<Vec<PriceBar>> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?;

        let mut reader = Reader::from_reader(file);
        let mut bars = Vec::new();

        for result in reader.deserialize() {
            let bar: PriceBar = result.context("Failed to parse price bar")?;
            bars.push(bar);
        }

        validate_bars(&bars)
            .with_context(|| format!("Invalid price series in {:?}", path.as_ref()))?;

        Ok(bars)
    }

    /// Save bars to a CSV file
    pub fn save_bars<P: AsRef<Path>>(bars: &[PriceBar], path: P) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create file: {:?}", path.as_ref()))?;

        let mut writer = Writer::from_writer(file);

        for bar in bars {
            writer.serialize(bar)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load and validate bars from a JSON file
    pub fn load_bars_json<P: AsRef<Path>>(path: P) -> Result<Vec<PriceBar>> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?;

        let bars: Vec<PriceBar> = serde_json::from_reader(file)?;

        validate_bars(&bars)
            .with_context(|| format!("Invalid price series in {:?}", path.as_ref()))?;

        Ok(bars)
    }

    /// Save bars to a JSON file
    pub fn save_bars_json<P: AsRef<Path>>(bars: &[PriceBar], path: P) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create file: {:?}", path.as_ref()))?;

        serde_json::to_writer_pretty(file, bars)?;
        Ok(())
    }
}
