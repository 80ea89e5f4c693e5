//! Error types

use crate::data::Interval;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single upstream call.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{exchange} api error (code {code}): {msg}")]
    Api {
        exchange: &'static str,
        code: String,
        msg: String,
    },

    #[error("malformed candle row: {0}")]
    Decode(String),
}

/// Errors surfaced by the fetcher, storage and batch driver.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// A page fetch failed while collecting one (symbol, interval, day) unit.
    #[error("fetch failed for {symbol} {interval} on {day}: {source}")]
    FetchFailure {
        symbol: String,
        interval: Interval,
        day: NaiveDate,
        #[source]
        source: DataError,
    },

    /// Loading the exchange market list failed.
    #[error("failed to load markets from {exchange}: {source}")]
    Markets {
        exchange: &'static str,
        #[source]
        source: DataError,
    },

    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no candle interval matches a granularity of {0} seconds")]
    Granularity(i64),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
