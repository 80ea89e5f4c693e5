//! Candle-Collector: daily OHLCV history collection from exchange REST APIs
//!
//! This crate rebuilds complete UTC days of candle data from paginated,
//! rate-limited kline endpoints and stores each day as a CSV file.
//!
//! # Features
//!
//! - **Data Management**: candle model, day series merge and CSV storage
//! - **Exchange Integration**: Binance spot klines and OKEx delivery contract candles
//! - **Fetcher**: timestamp-cursor pagination with boundary deduplication
//! - **Batch Driver**: day × symbol × interval iteration with an error report
//!
//! # Example
//!
//! ```no_run
//! use candle_collector::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = BinanceSpot::new("https://api.binance.com")?;
//!     let store = CandleStore::new("./data");
//!     let report = run_spot_batch(&source, &store, &SpotPlan::default()).await?;
//!     println!("errors: {:?}", report.errors);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod data;
pub mod error;
pub mod exchange;
pub mod fetcher;

// Re-export commonly used types
pub mod prelude {
    pub use crate::batch::*;
    pub use crate::config::*;
    pub use crate::data::*;
    pub use crate::error::*;
    pub use crate::exchange::*;
    pub use crate::fetcher::*;
}

/// Result type alias
pub type Result<T, E = error::CollectorError> = std::result::Result<T, E>;
