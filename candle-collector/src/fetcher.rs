//! Day-window pagination over a [`CandleSource`]

use crate::data::{day_window, Candle, CandleSeries, Interval};
use crate::error::CollectorError;
use crate::exchange::{CandleSource, Pacer};
use crate::Result;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

/// One (symbol, interval, day) unit to collect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleRequest {
    pub symbol: String,
    pub interval: Interval,
    pub day: NaiveDate,
    pub page_limit: Option<u32>,
}

impl CandleRequest {
    pub fn new(symbol: impl Into<String>, interval: Interval, day: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            day,
            page_limit: None,
        }
    }

    pub fn with_page_limit(mut self, page_limit: Option<u32>) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// UTC midnight opening the requested day
    pub fn day_start(&self) -> DateTime<Utc> {
        day_window(self.day).0
    }
}

/// Rebuilds full days of candles from a paginated source.
///
/// Each page is requested from the open time of the last candle already
/// received, so consecutive pages overlap by one record. The overlap is
/// resolved when the pages are merged into a [`CandleSeries`].
pub struct CandleFetcher<'a, S> {
    source: &'a S,
    pacer: Pacer,
}

impl<'a, S> CandleFetcher<'a, S>
where
    S: CandleSource,
{
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            pacer: Pacer::new(source.policy().min_call_interval),
        }
    }

    pub fn source(&self) -> &S {
        self.source
    }

    /// Collect one day. Any failing page aborts the unit with
    /// [`CollectorError::FetchFailure`].
    pub async fn fetch_day(&mut self, request: &CandleRequest) -> Result<CandleSeries> {
        let (day_start, window_end) = day_window(request.day);
        let mut cursor = day_start;
        let mut pages: Vec<Vec<Candle>> = Vec::new();

        loop {
            self.pacer.wait().await;
            let page = self
                .source
                .fetch_page(&request.symbol, request.interval, cursor, request.page_limit)
                .await
                .map_err(|source| CollectorError::FetchFailure {
                    symbol: request.symbol.clone(),
                    interval: request.interval,
                    day: request.day,
                    source,
                })?;

            let Some(last_open_time) = page.last().map(|c| c.open_time) else {
                debug!("{} {} {}: empty page at {}", request.symbol, request.interval, request.day, cursor);
                break;
            };
            let page_len = page.len();
            pages.push(page);
            debug!(
                "{} {} {}: {} candles up to {}",
                request.symbol, request.interval, request.day, page_len, last_open_time
            );

            if last_open_time >= window_end || page_len <= 1 {
                break;
            }
            if last_open_time <= cursor {
                warn!(
                    "{} {} {}: cursor stuck at {}, stopping pagination",
                    request.symbol, request.interval, request.day, cursor
                );
                break;
            }
            cursor = last_open_time;
        }

        Ok(CandleSeries::from_pages(pages, request.day))
    }
}
