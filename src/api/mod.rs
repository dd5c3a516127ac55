//! Market data provider clients

pub mod error;
pub mod yahoo;

pub use error::{ApiError, ApiResult};
pub use yahoo::YahooClient;
