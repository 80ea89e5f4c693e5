//! CSV file storage for collected days

use crate::data::CandleSeries;
use crate::error::CollectorError;
use crate::Result;
use chrono::NaiveDate;
use csv::Writer;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column layout of a written file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLayout {
    /// `candle_begin_time,open,high,low,close,volume`
    Spot,
    /// `timestamp,open,high,low,close,volume,currency_volume`
    Delivery,
}

impl CsvLayout {
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            Self::Spot => &["candle_begin_time", "open", "high", "low", "close", "volume"],
            Self::Delivery => &[
                "timestamp",
                "open",
                "high",
                "low",
                "close",
                "volume",
                "currency_volume",
            ],
        }
    }
}

/// Location of one unit's output file below the store root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFile {
    pub exchange: String,
    pub market_type: String,
    pub day: NaiveDate,
    /// File name without extension, e.g. `BTC-USDT_5m`
    pub stem: String,
}

impl UnitFile {
    pub fn new(exchange: &str, market_type: &str, day: NaiveDate, stem: String) -> Self {
        Self {
            exchange: exchange.to_string(),
            market_type: market_type.to_string(),
            day,
            stem,
        }
    }

    fn relative_dir(&self) -> PathBuf {
        PathBuf::from(&self.exchange)
            .join(&self.market_type)
            .join(self.day.format("%Y-%m-%d").to_string())
    }
}

/// Spot file stem: `BTC/USDT` + `5m` -> `BTC-USDT_5m`
pub fn spot_file_stem(symbol: &str, interval_label: &str) -> String {
    format!("{}_{}", symbol.replace('/', "-"), interval_label)
}

/// Writes one CSV per (exchange, market type, day, symbol, interval)
#[derive(Debug, Clone)]
pub struct CandleStore {
    root: PathBuf,
}

impl CandleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a unit's file
    pub fn path_for(&self, unit: &UnitFile) -> PathBuf {
        self.root
            .join(unit.relative_dir())
            .join(format!("{}.csv", unit.stem))
    }

    /// Write a series, creating missing directories. Returns the file path.
    pub fn write(&self, unit: &UnitFile, layout: CsvLayout, series: &CandleSeries) -> Result<PathBuf> {
        let dir = self.root.join(unit.relative_dir());
        fs::create_dir_all(&dir).map_err(|source| CollectorError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = self.path_for(unit);
        let file = File::create(&path).map_err(|source| CollectorError::Io {
            path: path.clone(),
            source,
        })?;
        let mut writer = Writer::from_writer(file);

        writer.write_record(layout.header())?;
        for candle in series {
            let mut record = vec![
                match layout {
                    CsvLayout::Spot => candle.open_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                    CsvLayout::Delivery => {
                        candle.open_time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
                    }
                },
                candle.open.to_string(),
                candle.high.to_string(),
                candle.low.to_string(),
                candle.close.to_string(),
                candle.volume.to_string(),
            ];
            if layout == CsvLayout::Delivery {
                record.push(candle.quote_volume.map(|v| v.to_string()).unwrap_or_default());
            }
            writer.write_record(&record)?;
        }

        writer.flush().map_err(|source| CollectorError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Wrote {} candles to {}", series.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Candle;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_storage() {
        let dir = tempfile::tempdir().unwrap();
        let store = CandleStore::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2019, 7, 1).unwrap();
        let candle = Candle::new(
            Utc.with_ymd_and_hms(2019, 7, 1, 0, 5, 0).unwrap(),
            100.0, 110.0, 95.0, 105.0, 1000.0,
        );
        let series = CandleSeries::from_pages(vec![vec![candle]], day);
        let unit = UnitFile::new("binance", "spot", day, spot_file_stem("BTC/USDT", "5m"));

        let path = store.write(&unit, CsvLayout::Spot, &series).unwrap();
        assert_eq!(
            path,
            dir.path().join("binance/spot/2019-07-01/BTC-USDT_5m.csv")
        );

        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            contents,
            "candle_begin_time,open,high,low,close,volume\n2019-07-01 00:05:00,100,110,95,105,1000\n"
        );
    }

    #[test]
    fn test_delivery_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = CandleStore::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2020, 7, 11).unwrap();
        let candle = Candle::new(
            Utc.with_ymd_and_hms(2020, 7, 11, 0, 0, 0).unwrap(),
            9200.5, 9210.0, 9190.0, 9205.0, 1520.0,
        )
        .with_quote_volume(16.5);
        let series = CandleSeries::from_pages(vec![vec![candle]], day);
        let unit = UnitFile::new("okex", "delivery", day, "BTC-USD-200717_5m_this_week".into());

        let path = store.write(&unit, CsvLayout::Delivery, &series).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("timestamp,open,high,low,close,volume,currency_volume")
        );
        assert_eq!(
            lines.next(),
            Some("2020-07-11T00:00:00.000Z,9200.5,9210,9190,9205,1520,16.5")
        );
    }
}
