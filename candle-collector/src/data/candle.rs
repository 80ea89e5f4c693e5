//! OHLCV candle data structures

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Candle bucket width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "3m")]
    M3,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "1d")]
    D1,
}

impl Interval {
    /// Label used in file names and by most kline endpoints (e.g. "5m")
    pub fn label(&self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M3 => "3m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H2 => "2h",
            Self::H4 => "4h",
            Self::H6 => "6h",
            Self::H12 => "12h",
            Self::D1 => "1d",
        }
    }

    /// Bucket width in seconds
    pub fn seconds(&self) -> i64 {
        match self {
            Self::M1 => 60,
            Self::M3 => 3 * 60,
            Self::M5 => 5 * 60,
            Self::M15 => 15 * 60,
            Self::M30 => 30 * 60,
            Self::H1 => 3600,
            Self::H2 => 2 * 3600,
            Self::H4 => 4 * 3600,
            Self::H6 => 6 * 3600,
            Self::H12 => 12 * 3600,
            Self::D1 => 86_400,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.seconds())
    }

    /// Inverse of [`Interval::seconds`], for endpoints keyed by granularity
    pub fn from_seconds(seconds: i64) -> Option<Self> {
        [
            Self::M1,
            Self::M3,
            Self::M5,
            Self::M15,
            Self::M30,
            Self::H1,
            Self::H2,
            Self::H4,
            Self::H6,
            Self::H12,
            Self::D1,
        ]
        .into_iter()
        .find(|interval| interval.seconds() == seconds)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" => Ok(Self::M1),
            "3m" => Ok(Self::M3),
            "5m" => Ok(Self::M5),
            "15m" => Ok(Self::M15),
            "30m" => Ok(Self::M30),
            "1h" => Ok(Self::H1),
            "2h" => Ok(Self::H2),
            "4h" => Ok(Self::H4),
            "6h" => Ok(Self::H6),
            "12h" => Ok(Self::H12),
            "1d" => Ok(Self::D1),
            other => Err(format!("Unsupported interval: {}", other)),
        }
    }
}

/// OHLCV candle as returned by the upstream, never mutated after decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time
    pub open_time: DateTime<Utc>,
    /// Opening price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Volume in base units (contracts for delivery futures)
    pub volume: f64,
    /// Volume converted to the settlement currency, delivery endpoints only
    pub quote_volume: Option<f64>,
}

impl Candle {
    /// Create a new candle
    pub fn new(
        open_time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
            quote_volume: None,
        }
    }

    pub fn with_quote_volume(mut self, quote_volume: f64) -> Self {
        self.quote_volume = Some(quote_volume);
        self
    }

    /// Open time as epoch milliseconds
    pub fn open_time_millis(&self) -> i64 {
        self.open_time.timestamp_millis()
    }
}

/// UTC `[start, end)` bounds of a calendar day
pub fn day_window(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Candles of one UTC day: unique by open time, ascending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    day: Option<NaiveDate>,
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Merge fetched pages into the series for `day`.
    ///
    /// Records outside the day are dropped, duplicated open times keep the
    /// record seen last, and the result is ordered by open time.
    pub fn from_pages<I>(pages: I, day: NaiveDate) -> Self
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = Candle>,
    {
        let mut by_open_time = BTreeMap::new();
        for candle in pages.into_iter().flatten() {
            if candle.open_time.date_naive() == day {
                by_open_time.insert(candle.open_time, candle);
            }
        }

        Self {
            day: Some(day),
            candles: by_open_time.into_values().collect(),
        }
    }

    /// Day this series was built for
    pub fn day(&self) -> Option<NaiveDate> {
        self.day
    }

    /// Get number of candles
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Check if series is empty
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Get candle at index
    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    /// Get last candle
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Get all candles
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    pub fn into_candles(self) -> Vec<Candle> {
        self.candles
    }
}

impl<'a> IntoIterator for &'a CandleSeries {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}
