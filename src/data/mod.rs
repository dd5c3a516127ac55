//! Price series types and persistence

pub mod loader;
pub mod types;

pub use loader::PriceLoader;
pub use types::{validate_bars, DataError, PriceBar};
