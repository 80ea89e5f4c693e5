//! Candle source abstraction and shared HTTP plumbing

use crate::data::{Candle, Interval};
use crate::error::DataError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Request policy of one upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePolicy {
    /// Row cap passed on every page request, `None` lets the upstream decide
    pub page_limit: Option<u32>,
    /// Minimum spacing between two consecutive calls
    pub min_call_interval: Duration,
}

impl Default for SourcePolicy {
    fn default() -> Self {
        Self {
            page_limit: None,
            min_call_interval: Duration::from_secs(1),
        }
    }
}

/// Upstream capable of serving historical candles page by page.
pub trait CandleSource {
    /// Exchange id used in output paths and error entries (e.g. "binance")
    fn exchange_id(&self) -> &'static str;

    fn policy(&self) -> SourcePolicy;

    /// Symbols the exchange currently lists, in the same notation as the
    /// symbols passed to [`CandleSource::fetch_page`].
    fn load_markets(&self) -> impl Future<Output = Result<Vec<String>, DataError>> + Send;

    /// Fetch one page of candles with open time at or after `since`,
    /// ordered ascending, at most `limit` rows when a limit is given.
    fn fetch_page(
        &self,
        symbol: &str,
        interval: Interval,
        since: DateTime<Utc>,
        limit: Option<u32>,
    ) -> impl Future<Output = Result<Vec<Candle>, DataError>> + Send;
}

pub(crate) fn http_client() -> Result<reqwest::Client, DataError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?)
}

/// Read a numeric cell that may be encoded as a JSON string or number.
pub(crate) fn cell_f64(row: &[Value], index: usize, name: &str) -> Result<f64, DataError> {
    match row.get(index) {
        Some(Value::String(s)) => s
            .parse::<f64>()
            .map_err(|e| DataError::Decode(format!("failed to parse {} '{}': {}", name, s, e))),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| DataError::Decode(format!("{} out of range: {}", name, n))),
        Some(other) => Err(DataError::Decode(format!("unexpected {} value: {}", name, other))),
        None => Err(DataError::Decode(format!("missing {} at column {}", name, index))),
    }
}
